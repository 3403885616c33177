//! Static classification configuration: entities, allowed sources and block keywords.
//!
//! The built-in [`Catalog::default`] covers the twelve municipalities and eight
//! islands of the Amami archipelago and the five local publishers. A YAML file
//! can replace any top-level section; sections it omits keep their defaults.
//!
//! # YAML Layout
//!
//! ```yaml
//! municipalities:
//!   - { id: amami, name: 奄美市, keywords: [奄美市] }
//! islands:
//!   - { id: amami_oshima, name: 奄美大島, keywords: [奄美大島, 奄美] }
//! sources:
//!   allowed:
//!     - { domain: amamishimbun.co.jp, name: 奄美新聞 }
//!   accepted_names: [奄美新聞]
//!   aliases:
//!     - { from: 琉球新報デジタル, to: 琉球新報 }
//!   strip_from_title: [奄美群島南三島経済新聞]
//! block_keywords: [タグ, まとめ]
//! ```

use crate::models::{Entity, EntityKind};
use serde::Deserialize;
use std::error::Error;
use std::path::Path;
use tracing::{info, instrument};

/// A publisher domain and its canonical display name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AllowedSource {
    pub domain: String,
    pub name: String,
}

/// An alternate brand string that is normalized to its parent brand.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BrandAlias {
    pub from: String,
    pub to: String,
}

/// Which publishers are accepted and how their names are normalized.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourcePolicy {
    /// Domains used in the `site:` restriction, in query order.
    pub allowed: Vec<AllowedSource>,
    /// Source names accepted after alias normalization.
    pub accepted_names: Vec<String>,
    #[serde(default)]
    pub aliases: Vec<BrandAlias>,
    /// Brand strings removed from a title before keyword matching.
    #[serde(default)]
    pub strip_from_title: Vec<String>,
}

impl SourcePolicy {
    /// Map an alternate brand name to its canonical name.
    pub fn normalize<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases
            .iter()
            .find(|alias| alias.from == name)
            .map(|alias| alias.to.as_str())
            .unwrap_or(name)
    }

    pub fn is_accepted(&self, name: &str) -> bool {
        self.accepted_names.iter().any(|n| n == name)
    }

    /// Remove every configured brand string so it cannot match an entity keyword.
    pub fn sanitize_title(&self, title: &str) -> String {
        self.strip_from_title
            .iter()
            .fold(title.to_string(), |acc, brand| acc.replace(brand.as_str(), ""))
    }
}

/// Everything the classifier and query builder need, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub municipalities: Vec<Entity>,
    pub islands: Vec<Entity>,
    pub sources: SourcePolicy,
    pub block_keywords: Vec<String>,
}

impl Catalog {
    /// The ordered entity list for one kind.
    pub fn entities(&self, kind: EntityKind) -> &[Entity] {
        match kind {
            EntityKind::Municipality => &self.municipalities,
            EntityKind::Island => &self.islands,
        }
    }

    /// True when the title contains any block keyword (case-sensitive).
    pub fn is_blocked(&self, title: &str) -> bool {
        self.block_keywords
            .iter()
            .any(|kw| title.contains(kw.as_str()))
    }

    /// Parse a YAML override on top of the built-in catalog.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        let file: CatalogFile = serde_yaml::from_str(yaml)?;
        let defaults = Catalog::default();
        Ok(Catalog {
            municipalities: file.municipalities.unwrap_or(defaults.municipalities),
            islands: file.islands.unwrap_or(defaults.islands),
            sources: file.sources.unwrap_or(defaults.sources),
            block_keywords: file.block_keywords.unwrap_or(defaults.block_keywords),
        })
    }

    /// Load the catalog from `path`, or the built-in one when `path` is `None`.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&Path>) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let Some(path) = path else {
            info!("Using built-in catalog");
            return Ok(Catalog::default());
        };
        let yaml = tokio::fs::read_to_string(path).await?;
        let catalog = Catalog::from_yaml(&yaml)?;
        info!(
            municipalities = catalog.municipalities.len(),
            islands = catalog.islands.len(),
            sources = catalog.sources.allowed.len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    municipalities: Option<Vec<Entity>>,
    islands: Option<Vec<Entity>>,
    sources: Option<SourcePolicy>,
    block_keywords: Option<Vec<String>>,
}

impl Default for Catalog {
    fn default() -> Self {
        let municipalities = vec![
            Entity::new("amami", "奄美市", &["奄美市"]),
            Entity::new("yamato", "大和村", &["大和村"]),
            Entity::new("uken", "宇検村", &["宇検村"]),
            Entity::new("setouchi", "瀬戸内町", &["瀬戸内町"]),
            Entity::new("tatsugo", "龍郷町", &["龍郷町"]),
            Entity::new("kikai", "喜界町", &["喜界町"]),
            Entity::new("tokunoshima", "徳之島町", &["徳之島町"]),
            Entity::new("amagi", "天城町", &["天城町"]),
            Entity::new("isen", "伊仙町", &["伊仙町"]),
            Entity::new("wadomari", "和泊町", &["和泊町"]),
            // "知名" alone is common in headlines without the 町 suffix
            Entity::new("china", "知名町", &["知名町", "知名"]),
            Entity::new("yoron", "与論町", &["与論町", "与論"]),
        ];

        // Generic Amami terms live on the last island so they only ever act as a fallback.
        let islands = vec![
            Entity::new("kikai_jima", "喜界島", &["喜界島"]),
            Entity::new("tokuno_shima", "徳之島", &["徳之島"]),
            Entity::new("okino_erabu", "沖永良部島", &["沖永良部", "沖永良部島"]),
            Entity::new("yoron_jima", "与論島", &["与論島"]),
            Entity::new("kakeroma_jima", "加計呂麻島", &["加計呂麻島", "加計呂麻"]),
            Entity::new("uke_jima", "請島", &["請島"]),
            Entity::new("yoro_shima", "与路島", &["与路島"]),
            Entity::new("amami_oshima", "奄美大島", &["奄美大島", "奄美", "奄美群島"]),
        ];

        let allowed = [
            ("amamishimbun.co.jp", "奄美新聞"),
            ("nankainn.com", "南海日日新聞"),
            ("amami-minamisantou.keizai.biz", "奄美群島南三島経済新聞"),
            ("ryukyushimpo.jp", "琉球新報"),
            ("373news.com", "南日本新聞"),
        ]
        .into_iter()
        .map(|(domain, name)| AllowedSource {
            domain: domain.to_string(),
            name: name.to_string(),
        })
        .collect();

        let sources = SourcePolicy {
            allowed,
            accepted_names: to_strings(&[
                "奄美新聞",
                "南海日日新聞",
                "奄美群島南三島経済新聞",
                "琉球新報",
                "琉球新報デジタル",
                "南日本新聞",
            ]),
            aliases: vec![BrandAlias {
                from: "琉球新報デジタル".to_string(),
                to: "琉球新報".to_string(),
            }],
            strip_from_title: to_strings(&["奄美群島南三島経済新聞"]),
        };

        let block_keywords = to_strings(&[
            "tag", "list", "category", "archive", "writer", "photo", "pr", "ad", "タグ", "一覧",
            "まとめ", "アーカイブ", "特集", "求人", "人事",
        ]);

        Catalog {
            municipalities,
            islands,
            sources,
            block_keywords,
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_shape() {
        let c = Catalog::default();
        assert_eq!(c.municipalities.len(), 12);
        assert_eq!(c.islands.len(), 8);
        assert_eq!(c.sources.allowed.len(), 5);
        assert_eq!(c.islands.last().unwrap().id, "amami_oshima");
    }

    #[test]
    fn test_alias_normalization() {
        let p = Catalog::default().sources;
        assert_eq!(p.normalize("琉球新報デジタル"), "琉球新報");
        assert_eq!(p.normalize("奄美新聞"), "奄美新聞");
        assert!(p.is_accepted("南海日日新聞"));
        assert!(!p.is_accepted("Google News"));
    }

    #[test]
    fn test_sanitize_title_strips_brand() {
        let p = Catalog::default().sources;
        assert_eq!(p.sanitize_title("奄美群島南三島経済新聞 新店オープン"), " 新店オープン");
    }

    #[test]
    fn test_block_keywords_are_case_sensitive() {
        let c = Catalog::default();
        assert!(c.is_blocked("奄美市のタグ"));
        assert!(c.is_blocked("an ad here"));
        assert!(!c.is_blocked("AD BREAK"));
    }

    #[test]
    fn test_yaml_override_keeps_missing_sections() {
        let yaml = r#"
municipalities:
  - { id: naze, name: 名瀬, keywords: [名瀬] }
block_keywords: [速報]
"#;
        let c = Catalog::from_yaml(yaml).unwrap();
        assert_eq!(c.municipalities.len(), 1);
        assert_eq!(c.municipalities[0].id, "naze");
        assert_eq!(c.block_keywords, vec!["速報".to_string()]);
        assert_eq!(c.islands, Catalog::default().islands);
        assert_eq!(c.sources, Catalog::default().sources);
    }

    #[test]
    fn test_yaml_sources_section() {
        let yaml = r#"
sources:
  allowed:
    - { domain: example.jp, name: 例新聞 }
  accepted_names: [例新聞]
"#;
        let c = Catalog::from_yaml(yaml).unwrap();
        assert_eq!(c.sources.allowed[0].domain, "example.jp");
        assert!(c.sources.aliases.is_empty());
        assert!(c.sources.strip_from_title.is_empty());
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        assert!(Catalog::from_yaml("municipalities: 3").is_err());
    }

    #[tokio::test]
    async fn test_load_without_path_uses_defaults() {
        let c = Catalog::load(None).await.unwrap();
        assert_eq!(c, Catalog::default());
    }
}
