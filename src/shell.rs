//! Search widgets / 搜索组件
//!
//! Each widget turns its current input into a suggestion list and keeps a
//! resolved value. Widgets never share state; the only thing they have in
//! common is the read-only [`CrewSource`].
//!
//! Responses can come back out of order. A widget only applies a result if
//! its ticket is newer than the last one applied (last response wins).

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

use crate::config::{PageConfig, WidgetConfig};
use crate::db::CrewSource;
use crate::error::{DataSourceError, ShellError};
use crate::models::CrewRecord;

/// Widget value: a chosen record, or raw text that resolved to nothing / 组件当前值
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Resolved {
    Record(CrewRecord),
    Text(String),
}

/// Issued for every input change / 查询序号
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchTicket(u64);

impl SearchTicket {
    pub fn seq(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub label: String,
    pub record: CrewRecord,
}

/// Serializable view of one widget / 组件快照
#[derive(Debug, Clone, Serialize)]
pub struct WidgetSnapshot {
    pub key: String,
    pub label: String,
    pub placeholder: String,
    pub input: String,
    pub seq: u64,
    pub suggestions: Vec<Suggestion>,
    pub error: Option<String>,
    pub value: Resolved,
}

#[derive(Debug)]
pub struct SearchWidget {
    config: WidgetConfig,
    input: String,
    issued: u64,
    applied: u64,
    suggestions: Vec<CrewRecord>,
    error: Option<String>,
    value: Resolved,
}

impl SearchWidget {
    pub fn new(config: WidgetConfig) -> Self {
        let value = Resolved::Text(config.default.clone());
        Self {
            config,
            input: String::new(),
            issued: 0,
            applied: 0,
            suggestions: Vec::new(),
            error: None,
            value,
        }
    }

    pub fn suggestions(&self) -> &[CrewRecord] {
        &self.suggestions
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Record new input and hand out a ticket for its query
    pub fn begin_search(&mut self, text: &str) -> SearchTicket {
        self.input = text.to_string();
        self.issued += 1;
        SearchTicket(self.issued)
    }

    /// Apply a query result. Returns false if a newer result was already applied.
    pub fn finish_search(
        &mut self,
        ticket: SearchTicket,
        result: Result<Vec<CrewRecord>, DataSourceError>,
    ) -> bool {
        if ticket.0 <= self.applied {
            return false;
        }
        self.applied = ticket.0;
        match result {
            Ok(records) => {
                self.suggestions = records;
                self.error = None;
            }
            Err(e) => {
                self.suggestions.clear();
                self.error = Some(e.to_string());
            }
        }
        true
    }

    /// Resolve to the suggestion at `index`
    pub fn select(&mut self, index: usize) -> Result<&Resolved, ShellError> {
        let record = self
            .suggestions
            .get(index)
            .cloned()
            .ok_or(ShellError::SelectionOutOfRange {
                index,
                len: self.suggestions.len(),
            })?;
        self.input = record.label();
        self.value = Resolved::Record(record);
        Ok(&self.value)
    }

    /// Resolve typed text: an exact (case-insensitive) name among the current
    /// suggestions wins, anything else is kept as raw text.
    pub fn submit(&mut self, text: &str) -> &Resolved {
        let needle = text.to_lowercase();
        let matched = self
            .suggestions
            .iter()
            .find(|r| r.name().is_some_and(|n| n.to_lowercase() == needle))
            .cloned();

        self.input = text.to_string();
        self.value = match matched {
            Some(record) => Resolved::Record(record),
            None => Resolved::Text(text.to_string()),
        };
        &self.value
    }

    /// Back to the configured default. Tickets stay monotonic.
    pub fn reset(&mut self) {
        self.input.clear();
        self.suggestions.clear();
        self.error = None;
        self.applied = self.issued;
        self.value = Resolved::Text(self.config.default.clone());
    }

    pub fn snapshot(&self) -> WidgetSnapshot {
        WidgetSnapshot {
            key: self.config.key.clone(),
            label: self.config.label.clone(),
            placeholder: self.config.placeholder.clone(),
            input: self.input.clone(),
            seq: self.issued,
            suggestions: self
                .suggestions
                .iter()
                .map(|r| Suggestion {
                    label: r.label(),
                    record: r.clone(),
                })
                .collect(),
            error: self.error.clone(),
            value: self.value.clone(),
        }
    }
}

/// Result of one widget search / 组件查询结果
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    /// False when a newer response had already been applied
    pub applied: bool,
    pub widget: WidgetSnapshot,
}

/// The page: a title and independent widgets over one data source / 页面
pub struct Shell {
    source: Arc<dyn CrewSource>,
    title: String,
    preview: Option<String>,
    widgets: Vec<(String, Mutex<SearchWidget>)>,
}

/// Whole-page view / 页面快照
#[derive(Debug, Clone, Serialize)]
pub struct PageSnapshot {
    pub title: String,
    pub preview: Option<String>,
    pub widgets: Vec<WidgetSnapshot>,
}

impl Shell {
    pub fn new(source: Arc<dyn CrewSource>, page: &PageConfig) -> Self {
        Self {
            source,
            title: page.title.clone(),
            preview: page.preview.clone(),
            widgets: page
                .widgets
                .iter()
                .cloned()
                .map(|w| (w.key.clone(), Mutex::new(SearchWidget::new(w))))
                .collect(),
        }
    }

    pub fn source(&self) -> &Arc<dyn CrewSource> {
        &self.source
    }

    fn widget(&self, key: &str) -> Result<&Mutex<SearchWidget>, ShellError> {
        self.widgets
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, w)| w)
            .ok_or_else(|| ShellError::UnknownWidget(key.to_string()))
    }

    pub fn page(&self) -> PageSnapshot {
        PageSnapshot {
            title: self.title.clone(),
            preview: self.preview.clone(),
            widgets: self.widgets.iter().map(|(_, w)| w.lock().snapshot()).collect(),
        }
    }

    pub fn snapshot(&self, key: &str) -> Result<WidgetSnapshot, ShellError> {
        Ok(self.widget(key)?.lock().snapshot())
    }

    /// Run the widget's query for `text`. The lock is not held while querying.
    pub async fn search(&self, key: &str, text: &str) -> Result<SearchOutcome, ShellError> {
        let widget = self.widget(key)?;
        let ticket = widget.lock().begin_search(text);

        let result = self.source.search_crew_by_name(text).await;
        if let Err(ref e) = result {
            tracing::warn!("Search failed for widget {}: {}", key, e);
        }

        let mut guard = widget.lock();
        let applied = guard.finish_search(ticket, result);
        if !applied {
            tracing::debug!("Discarded stale response for widget {} (seq {})", key, ticket.seq());
        }
        Ok(SearchOutcome {
            applied,
            widget: guard.snapshot(),
        })
    }

    pub fn select(&self, key: &str, index: usize) -> Result<WidgetSnapshot, ShellError> {
        let mut guard = self.widget(key)?.lock();
        guard.select(index)?;
        Ok(guard.snapshot())
    }

    pub fn submit(&self, key: &str, text: &str) -> Result<WidgetSnapshot, ShellError> {
        let mut guard = self.widget(key)?.lock();
        guard.submit(text);
        Ok(guard.snapshot())
    }

    pub fn reset(&self, key: &str) -> Result<WidgetSnapshot, ShellError> {
        let mut guard = self.widget(key)?.lock();
        guard.reset();
        Ok(guard.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldValue;
    use async_trait::async_trait;
    use std::time::Duration;

    fn crew(name: &str) -> CrewRecord {
        CrewRecord::from_iter([("name", FieldValue::from(name)), ("rarity", FieldValue::from("common"))])
    }

    /// Canned in-memory source using the same matching rule as the store
    struct StaticCrew(Vec<CrewRecord>);

    #[async_trait]
    impl CrewSource for StaticCrew {
        async fn search_crew_by_name(&self, fragment: &str) -> Result<Vec<CrewRecord>, DataSourceError> {
            let needle = fragment.to_lowercase();
            Ok(self
                .0
                .iter()
                .filter(|r| r.name().is_some_and(|n| n.to_lowercase().contains(&needle)))
                .cloned()
                .collect())
        }
    }

    struct BrokenCrew;

    #[async_trait]
    impl CrewSource for BrokenCrew {
        async fn search_crew_by_name(&self, _fragment: &str) -> Result<Vec<CrewRecord>, DataSourceError> {
            Err(DataSourceError::Timeout(Duration::from_secs(10)))
        }
    }

    /// Answers like `StaticCrew`, but holds back one fragment
    struct DelayedCrew {
        inner: StaticCrew,
        slow_fragment: &'static str,
        delay: Duration,
    }

    #[async_trait]
    impl CrewSource for DelayedCrew {
        async fn search_crew_by_name(&self, fragment: &str) -> Result<Vec<CrewRecord>, DataSourceError> {
            if fragment == self.slow_fragment {
                tokio::time::sleep(self.delay).await;
            }
            self.inner.search_crew_by_name(fragment).await
        }
    }

    fn shell() -> Shell {
        let source = StaticCrew(vec![crew("Anna Tolle"), crew("Sammy Banx"), crew("Banxwell")]);
        Shell::new(Arc::new(source), &PageConfig::default())
    }

    #[test]
    fn test_initial_state_is_default() {
        let page = shell().page();
        assert_eq!(page.title, "Star Atlas Crew");
        assert_eq!(page.widgets[0].key, "crew1_search");
        assert_eq!(page.widgets[0].value, Resolved::Text("Anna Tolle".to_string()));
        assert_eq!(page.widgets[1].value, Resolved::Text("Sammy Banx".to_string()));
        assert_eq!(page.widgets[1].placeholder, "Sammy Banx");
        assert!(page.widgets[0].suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_search_and_select() {
        let shell = shell();
        let outcome = shell.search("crew1_search", "banx").await.unwrap();
        assert!(outcome.applied);
        let labels: Vec<&str> = outcome.widget.suggestions.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Sammy Banx", "Banxwell"]);

        let snapshot = shell.select("crew1_search", 1).unwrap();
        assert_eq!(snapshot.value, Resolved::Record(crew("Banxwell")));
        assert_eq!(snapshot.input, "Banxwell");
    }

    #[tokio::test]
    async fn test_widgets_are_independent() {
        let shell = shell();
        shell.search("crew1_search", "Sammy").await.unwrap();
        shell.select("crew1_search", 0).unwrap();

        let other = shell.snapshot("crew2_search").unwrap();
        assert_eq!(other.value, Resolved::Text("Sammy Banx".to_string()));
        assert!(other.suggestions.is_empty());
        assert_eq!(other.seq, 0);

        // Same crew member in both widgets is allowed
        shell.search("crew2_search", "Sammy").await.unwrap();
        let both = shell.select("crew2_search", 0).unwrap();
        assert_eq!(both.value, shell.snapshot("crew1_search").unwrap().value);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut widget = SearchWidget::new(WidgetConfig::new("w", "W", "Anna Tolle"));
        let older = widget.begin_search("B");
        let newer = widget.begin_search("Banxw");

        assert!(widget.finish_search(newer, Ok(vec![crew("Banxwell")])));
        assert!(!widget.finish_search(older, Ok(vec![crew("Sammy Banx"), crew("Banxwell")])));
        assert_eq!(widget.suggestions(), &[crew("Banxwell")]);
    }

    #[test]
    fn test_in_order_responses_both_apply() {
        let mut widget = SearchWidget::new(WidgetConfig::new("w", "W", "Anna Tolle"));
        let first = widget.begin_search("B");
        let second = widget.begin_search("Ba");
        assert!(widget.finish_search(first, Ok(vec![crew("Sammy Banx")])));
        assert!(widget.finish_search(second, Ok(vec![crew("Banxwell")])));
        assert_eq!(widget.suggestions(), &[crew("Banxwell")]);
    }

    #[test]
    fn test_error_clears_suggestions() {
        let mut widget = SearchWidget::new(WidgetConfig::new("w", "W", "Anna Tolle"));
        let ticket = widget.begin_search("Anna");
        widget.finish_search(ticket, Ok(vec![crew("Anna Tolle")]));

        let ticket = widget.begin_search("Ann");
        let err = DataSourceError::Timeout(Duration::from_secs(1));
        assert!(widget.finish_search(ticket, Err(err)));
        assert!(widget.suggestions().is_empty());
        assert!(widget.error().unwrap().contains("timed out"));

        let ticket = widget.begin_search("Anna");
        widget.finish_search(ticket, Ok(vec![crew("Anna Tolle")]));
        assert!(widget.error().is_none());
    }

    #[tokio::test]
    async fn test_failed_search_surfaces_error() {
        let shell = Shell::new(Arc::new(BrokenCrew), &PageConfig::default());
        let outcome = shell.search("crew2_search", "Sam").await.unwrap();
        assert!(outcome.applied);
        assert!(outcome.widget.suggestions.is_empty());
        assert!(outcome.widget.error.is_some());
        assert_eq!(outcome.widget.value, Resolved::Text("Sammy Banx".to_string()));
    }

    #[tokio::test]
    async fn test_submit_resolves_or_keeps_text() {
        let shell = shell();
        shell.search("crew1_search", "anna").await.unwrap();

        let resolved = shell.submit("crew1_search", "anna tolle").unwrap();
        assert_eq!(resolved.value, Resolved::Record(crew("Anna Tolle")));

        let raw = shell.submit("crew1_search", "Nobody Here").unwrap();
        assert_eq!(raw.value, Resolved::Text("Nobody Here".to_string()));
    }

    #[tokio::test]
    async fn test_select_out_of_range_and_unknown_widget() {
        let shell = shell();
        shell.search("crew1_search", "zzz").await.unwrap();
        assert!(matches!(
            shell.select("crew1_search", 0),
            Err(ShellError::SelectionOutOfRange { index: 0, len: 0 })
        ));
        assert!(matches!(shell.snapshot("crew3_search"), Err(ShellError::UnknownWidget(_))));
        assert!(shell.search("crew3_search", "a").await.is_err());
    }

    #[tokio::test]
    async fn test_reset_restores_default() {
        let shell = shell();
        shell.search("crew1_search", "Banx").await.unwrap();
        shell.select("crew1_search", 0).unwrap();

        let snapshot = shell.reset("crew1_search").unwrap();
        assert_eq!(snapshot.value, Resolved::Text("Anna Tolle".to_string()));
        assert!(snapshot.suggestions.is_empty());
        assert_eq!(snapshot.seq, 1);
    }

    #[test]
    fn test_resolved_serializes_untagged() {
        assert_eq!(serde_json::to_string(&Resolved::Text("Anna".into())).unwrap(), r#""Anna""#);
        let record = Resolved::Record(crew("Anna Tolle"));
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"name":"Anna Tolle","rarity":"common"}"#
        );
    }

    #[tokio::test]
    async fn test_overlapping_searches_keep_latest() {
        let source = DelayedCrew {
            inner: StaticCrew(vec![crew("Anna Tolle"), crew("Sammy Banx"), crew("Banxwell")]),
            slow_fragment: "a",
            delay: Duration::from_millis(150),
        };
        let shell = Shell::new(Arc::new(source), &PageConfig::default());

        let slow = shell.search("crew1_search", "a");
        let fast = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            shell.search("crew1_search", "banxw").await
        };
        let (slow, fast) = tokio::join!(slow, fast);

        let fast = fast.unwrap();
        assert!(fast.applied);
        let slow = slow.unwrap();
        assert!(!slow.applied);

        let widget = shell.snapshot("crew1_search").unwrap();
        assert_eq!(widget.input, "banxw");
        let labels: Vec<&str> = widget.suggestions.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Banxwell"]);

        // The other widget saw none of it
        let other = shell.snapshot("crew2_search").unwrap();
        assert!(other.suggestions.is_empty());
    }
}
