//! Per-site extraction strategies.
//!
//! A strategy turns a page's HTML into raw item nodes. Which strategy runs is
//! chosen by `[target] strategy` in the configuration, so supporting another
//! site means new selectors, not a new pipeline.

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{RawItem, StrategyKind, TargetConfig};

/// Capability: given raw page HTML, produce raw item nodes in page order.
pub trait ExtractStrategy: Send + Sync {
    /// Short name for logs and snapshots.
    fn name(&self) -> &'static str;

    fn extract(&self, html: &str) -> Vec<RawItem>;
}

/// Build the strategy selected by configuration.
pub fn from_config(target: &TargetConfig) -> Result<Box<dyn ExtractStrategy>> {
    let links = LinkStrategy::new(target.min_link_text)?;
    Ok(match target.strategy {
        StrategyKind::Cards => Box::new(CardStrategy::new(target, links)?),
        StrategyKind::Links => Box::new(links),
    })
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

/// Card containers with per-field sub-selectors.
///
/// Falls back to [`LinkStrategy`] when the page has no matching card at all.
pub struct CardStrategy {
    card: Selector,
    title: Selector,
    link: Selector,
    source: Selector,
    time: Selector,
    summary: Selector,
    fallback: LinkStrategy,
}

impl CardStrategy {
    pub fn new(target: &TargetConfig, fallback: LinkStrategy) -> Result<Self> {
        Ok(Self {
            card: parse_selector(&target.card_selector)?,
            title: parse_selector(&target.title_selector)?,
            link: parse_selector(&target.link_selector)?,
            source: parse_selector(&target.source_selector)?,
            time: parse_selector(&target.time_selector)?,
            summary: parse_selector(&target.summary_selector)?,
            fallback,
        })
    }

    fn parse_card(&self, card: ElementRef<'_>) -> Option<RawItem> {
        let title_elem = card.select(&self.title).next();
        let title = title_elem.map(element_text).unwrap_or_default();
        if title.is_empty() {
            return None;
        }

        let link = card
            .select(&self.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(|href| href.trim().to_string())
            .and_then(non_empty);

        let source = card
            .select(&self.source)
            .next()
            .map(element_text)
            .and_then(non_empty);

        // Prefer the machine-readable `datetime` attribute over display text.
        let pub_time = card
            .select(&self.time)
            .next()
            .map(|el| match el.value().attr("datetime") {
                Some(dt) => dt.trim().to_string(),
                None => element_text(el),
            })
            .and_then(non_empty);

        let summary = card
            .select(&self.summary)
            .find(|el| Some(el.id()) != title_elem.map(|t| t.id()))
            .map(element_text)
            .and_then(non_empty);

        Some(RawItem {
            title,
            link,
            source,
            pub_time,
            summary,
        })
    }
}

impl ExtractStrategy for CardStrategy {
    fn name(&self) -> &'static str {
        "cards"
    }

    fn extract(&self, html: &str) -> Vec<RawItem> {
        let document = Html::parse_document(html);
        let mut cards = document.select(&self.card).peekable();

        if cards.peek().is_none() {
            log::info!("No card elements found, falling back to link extraction");
            return self.fallback.extract(html);
        }

        let items: Vec<RawItem> = cards.filter_map(|card| self.parse_card(card)).collect();
        log::debug!("Card strategy extracted {} items", items.len());
        items
    }
}

/// Generic fallback: every sufficiently long, non-fragment, non-script link.
pub struct LinkStrategy {
    anchor: Selector,
    min_text: usize,
}

impl LinkStrategy {
    pub fn new(min_text: usize) -> Result<Self> {
        Ok(Self {
            anchor: parse_selector("a[href]")?,
            min_text,
        })
    }

    fn is_candidate(&self, text: &str, href: &str) -> bool {
        !text.is_empty()
            && text.chars().count() > self.min_text
            && !href.contains('#')
            && !href.trim_start().to_ascii_lowercase().starts_with("javascript:")
    }
}

impl ExtractStrategy for LinkStrategy {
    fn name(&self) -> &'static str {
        "links"
    }

    fn extract(&self, html: &str) -> Vec<RawItem> {
        let document = Html::parse_document(html);
        document
            .select(&self.anchor)
            .filter_map(|a| {
                let href = a.value().attr("href")?;
                let text = element_text(a);
                self.is_candidate(&text, href)
                    .then(|| RawItem::new(text, href.trim()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARDS: &str = r#"
        <html><body>
          <div class="card">
            <h3 class="title">1. Alpha  launches</h3>
            <a href="/s/alpha">open</a>
            <span class="source">知乎</span>
            <time datetime="2025-03-09T08:00:00">3 hours ago</time>
            <p class="summary">Alpha summary</p>
          </div>
          <div class="card">
            <a href="https://github.com/b">Beta repo trending</a>
            <span class="date">昨天</span>
          </div>
          <div class="card"><span>no title here</span></div>
        </body></html>
    "#;

    fn cards() -> Box<dyn ExtractStrategy> {
        from_config(&TargetConfig::default()).unwrap()
    }

    #[test]
    fn test_card_fields() {
        let items = cards().extract(CARDS);
        assert_eq!(items.len(), 2);

        let alpha = &items[0];
        assert_eq!(alpha.title, "1. Alpha  launches");
        assert_eq!(alpha.link.as_deref(), Some("/s/alpha"));
        assert_eq!(alpha.source.as_deref(), Some("知乎"));
        assert_eq!(alpha.pub_time.as_deref(), Some("2025-03-09T08:00:00"));
        assert_eq!(alpha.summary.as_deref(), Some("Alpha summary"));

        let beta = &items[1];
        assert_eq!(beta.title, "Beta repo trending");
        assert_eq!(beta.link.as_deref(), Some("https://github.com/b"));
        assert_eq!(beta.source, None);
        assert_eq!(beta.pub_time.as_deref(), Some("昨天"));
    }

    #[test]
    fn test_cards_fall_back_to_links() {
        let html = r##"
            <ul>
              <li><a href="/a">A sufficiently long headline</a></li>
              <li><a href="#top">Back to the top of page</a></li>
              <li><a href="javascript:void(0)">Open the menu drawer now</a></li>
              <li><a href="/short">Short</a></li>
            </ul>
        "##;
        let items = cards().extract(html);
        assert_eq!(items, vec![RawItem::new("A sufficiently long headline", "/a")]);
    }

    #[test]
    fn test_links_strategy_selected_by_config() {
        let target = TargetConfig {
            strategy: StrategyKind::Links,
            ..TargetConfig::default()
        };
        let strategy = from_config(&target).unwrap();
        assert_eq!(strategy.name(), "links");

        // Cards are ignored entirely by the link strategy.
        let items = strategy.extract(CARDS);
        assert_eq!(items, vec![RawItem::new("Beta repo trending", "https://github.com/b")]);
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let target = TargetConfig {
            card_selector: "[[invalid".into(),
            ..TargetConfig::default()
        };
        assert!(matches!(
            from_config(&target).err(),
            Some(AppError::Selector { .. })
        ));
    }
}
