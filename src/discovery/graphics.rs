use crate::error::Result;
use crate::search::{Record, SearchService, first_value, query};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Number of graphics requested for a report.
pub const DEFAULT_GRAPHICS_COUNT: usize = 5;

/// Landing page used by placeholder graphics.
pub const PLACEHOLDER_URL: &str = "https://gallica.bnf.fr/accueil/fr/content/accueil-fr";

/// Gallica logo used as the placeholder thumbnail.
pub const PLACEHOLDER_THUMBNAIL: &str =
    "https://gallica.bnf.fr/accueil/sites/accueil/files/logo_gallica.png";

const GALLICA_ROOT: &str = "https://gallica.bnf.fr";

static ARK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"ark:/\d+/[A-Za-z0-9]+").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphicKind {
    Image,
    Map,
}

impl GraphicKind {
    fn label(self) -> &'static str {
        match self {
            GraphicKind::Image => "Image",
            GraphicKind::Map => "Map",
        }
    }
}

/// An illustrative image or map discovered for a report topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graphic {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub kind: GraphicKind,
    pub url: String,
    pub thumbnail: String,
}

/// Extract the ARK identifier (`ark:/NAAN/name`) from a URL.
pub fn extract_ark(url: &str) -> Option<&str> {
    ARK.find(url).map(|m| m.as_str())
}

impl Graphic {
    fn from_record(id: u32, kind: GraphicKind, topic: &str, record: &Record) -> Self {
        let title = first_value(&record.title).unwrap_or("Untitled").to_string();
        let url = record.url.as_deref().unwrap_or_default();
        let url = url.strip_suffix("/thumbnail").unwrap_or(url).to_string();
        let thumbnail = extract_ark(&url)
            .map(|ark| format!("{}/{}/thumbnail", GALLICA_ROOT, ark))
            .unwrap_or_default();

        Self {
            id,
            description: format!("{} related to {}: {}", kind.label(), topic, title),
            title,
            kind,
            url,
            thumbnail,
        }
    }

    fn placeholders(topic: &str) -> Vec<Self> {
        [(1, GraphicKind::Image, "Images"), (2, GraphicKind::Map, "Maps")]
            .into_iter()
            .map(|(id, kind, plural)| Self {
                id,
                title: format!("{} related to {}", plural, topic),
                description: format!(
                    "Browse Gallica for {} related to {}",
                    plural.to_lowercase(),
                    topic
                ),
                kind,
                url: PLACEHOLDER_URL.to_string(),
                thumbnail: PLACEHOLDER_THUMBNAIL.to_string(),
            })
            .collect()
    }
}

/// Find up to `target_count` images and maps illustrating `topic`.
///
/// Images and maps are searched independently, each on the topic's first
/// word and then on the whole topic. A layer whose search fails counts as
/// empty without affecting the other. If both come back empty a single broad
/// visual-material query is tried, and failing that two placeholders are
/// returned.
pub async fn discover_graphics(
    search: &dyn SearchService,
    topic: &str,
    target_count: usize,
) -> Vec<Graphic> {
    let limit = target_count.max(1) as u32;
    let keyword = topic.split_whitespace().next().unwrap_or(topic);

    let (images, maps) = futures::join!(
        layer(search, query::image, keyword, topic, limit),
        layer(search, query::map, keyword, topic, limit),
    );
    let mut images = or_empty(topic, "image", images);
    let maps = or_empty(topic, "map", maps);

    if images.is_empty() && maps.is_empty() {
        let broad = search
            .search(&query::visual_material(keyword), 1, limit)
            .await
            .map(|page| page.records);
        images = or_empty(topic, "visual material", broad);
    }

    let mut graphics: Vec<Graphic> = images
        .iter()
        .map(|r| (GraphicKind::Image, r))
        .chain(maps.iter().map(|r| (GraphicKind::Map, r)))
        .zip(1..)
        .map(|((kind, record), id)| Graphic::from_record(id, kind, topic, record))
        .collect();

    if graphics.is_empty() {
        debug!(topic, "no graphics found, using placeholders");
        graphics = Graphic::placeholders(topic);
    }

    graphics.truncate(target_count);
    graphics
}

fn or_empty(topic: &str, layer: &str, found: Result<Vec<Record>>) -> Vec<Record> {
    found.unwrap_or_else(|e| {
        warn!(topic, layer, error = %e, "graphics search failed");
        Vec::new()
    })
}

/// Search one media type on the keyword, falling back to the full topic.
async fn layer(
    search: &dyn SearchService,
    build: fn(&str) -> String,
    keyword: &str,
    topic: &str,
    limit: u32,
) -> Result<Vec<Record>> {
    let records = search.search(&build(keyword), 1, limit).await?.records;
    if !records.is_empty() {
        return Ok(records);
    }
    Ok(search.search(&build(topic), 1, limit).await?.records)
}
