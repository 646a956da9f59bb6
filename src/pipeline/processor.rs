//! Edit processor — applies parsed edits to a content store.
//!
//! **Core invariant: one result per edit, in order.** A failing edit becomes a
//! failure result; it never stops the edits after it.
//!
//! Flow per edit:
//! 1. Read the current page (absence is a normal outcome, not an error)
//! 2. Compute the new content from the operation
//! 3. Write it back
//!
//! Edits run strictly one after another: a later edit may target a page an
//! earlier one just wrote, and the store offers no locking.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{ProcessorOptions, ReadFailurePolicy, VerbStyle};
use crate::error::EditError;
use crate::pipeline::types::{Edit, EditResult, Operation};
use crate::store::ContentStore;

/// Applies edits against a store, collecting one result per edit.
pub struct EditProcessor {
    store: Arc<dyn ContentStore>,
    options: ProcessorOptions,
}

impl EditProcessor {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self::with_options(store, ProcessorOptions::default())
    }

    pub fn with_options(store: Arc<dyn ContentStore>, options: ProcessorOptions) -> Self {
        Self { store, options }
    }

    /// Apply every edit in order.
    ///
    /// Failures on individual edits are logged and reported, never propagated.
    pub async fn apply(&self, edits: &[Edit]) -> Vec<EditResult> {
        let count = edits.len();
        info!(count, store = self.store.name(), "Applying edits");

        let mut results = Vec::with_capacity(count);
        for edit in edits {
            let result = match self.process(edit).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(
                        title = %edit.title(),
                        operation = edit.operation().label(),
                        error = %e,
                        "Edit failed"
                    );
                    EditResult::failure(format!(
                        "got error {e} while processing this edit:\n{}",
                        edit.raw_segment()
                    ))
                }
            };
            results.push(result);
        }

        let succeeded = results.iter().filter(|r| r.is_success()).count();
        info!(succeeded, failed = count - succeeded, "Edits applied");
        results
    }

    /// Apply a single edit and describe what happened.
    pub async fn process(&self, edit: &Edit) -> Result<EditResult, EditError> {
        if edit.operation() == Operation::Unknown {
            return Err(unknown_operation(edit));
        }

        let current = self.read_current(edit.title()).await?;
        let (content, verb) = self.new_content(edit, current)?;

        self.store.write(edit.title(), &content).await?;

        debug!(title = %edit.title(), verb, bytes = content.len(), "Edit applied");
        Ok(EditResult::success(format!("{verb} \"{}\"", edit.title())))
    }

    async fn read_current(&self, title: &str) -> Result<Option<String>, EditError> {
        match self.store.read(title).await {
            Ok(page) => Ok(page.into_content()),
            // A bad title or undecodable page must never be overwritten as new.
            Err(e) if e.is_page_error() => Err(e.into()),
            Err(e) => match self.options.read_failures {
                ReadFailurePolicy::TreatAsAbsent => {
                    warn!(title, error = %e, "Read failed, treating page as absent");
                    Ok(None)
                }
                ReadFailurePolicy::Fail => Err(e.into()),
            },
        }
    }

    fn new_content(
        &self,
        edit: &Edit,
        current: Option<String>,
    ) -> Result<(String, &'static str), EditError> {
        let body = edit.body();
        let combined = self.options.verb_style == VerbStyle::Combined;

        Ok(match (edit.operation(), current) {
            (Operation::Unknown, _) => return Err(unknown_operation(edit)),
            (_, None) => (body.to_string(), if combined { "created/replaced" } else { "created" }),
            (Operation::Replace, Some(_)) => {
                (body.to_string(), if combined { "created/replaced" } else { "replaced" })
            }
            (Operation::Append, Some(current)) => (format!("{current}\n{body}"), "appended to"),
            (Operation::Prepend, Some(current)) => (format!("{body}\n{current}"), "prepended to"),
            (Operation::InsertSorted, Some(current)) => {
                (insert_sorted(&current, body), "alphabetically inserted into")
            }
        })
    }
}

/// Insert `line` before the first line of `content` that sorts after it, or at
/// the end when none does.
///
/// A trailing newline in `content` counts as a final empty line, which is
/// kept.
pub fn insert_sorted(content: &str, line: &str) -> String {
    let mut lines: Vec<&str> = content.split('\n').collect();
    match lines.iter().position(|existing| *existing > line) {
        Some(at) => lines.insert(at, line),
        None => lines.push(line),
    }
    lines.join("\n")
}

fn unknown_operation(edit: &Edit) -> EditError {
    EditError::UnknownOperation {
        line: first_line(edit.raw_segment()).to_string(),
    }
}

fn first_line(text: &str) -> &str {
    text.split('\n').next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::parser::parse_segment;
    use crate::store::{MemoryStore, Page};

    fn processor(store: &Arc<MemoryStore>) -> EditProcessor {
        EditProcessor::new(Arc::clone(store) as Arc<dyn ContentStore>)
    }

    fn edit(marker: &str, title: &str, body: &str) -> Edit {
        parse_segment(&format!("{marker}{title}\n{body}"))
    }

    // ── Operations ──────────────────────────────────────────────────

    #[tokio::test]
    async fn replace_existing_page() {
        let store = Arc::new(MemoryStore::with_pages([("foo", "existing content")]));
        let result = processor(&store)
            .process(&edit(">", "foo", "foo body"))
            .await
            .unwrap();

        assert_eq!(result.to_string(), r#"success: replaced "foo""#);
        assert_eq!(store.get("foo").await.as_deref(), Some("foo body"));
    }

    #[tokio::test]
    async fn replace_creates_new_page() {
        let store = Arc::new(MemoryStore::new());
        let result = processor(&store)
            .process(&edit(">", "foo", "foo body"))
            .await
            .unwrap();

        assert_eq!(result.to_string(), r#"success: created "foo""#);
        assert_eq!(store.read("foo").await.unwrap(), Page::Present("foo body".into()));
    }

    #[tokio::test]
    async fn append_to_missing_page_creates_it() {
        let store = Arc::new(MemoryStore::new());
        for marker in [">>", "<<", "<"] {
            let title = format!("new{marker}");
            let result = processor(&store)
                .process(&edit(marker, &title, "foo body"))
                .await
                .unwrap();
            assert_eq!(result.to_string(), format!("success: created \"{title}\""));
            assert_eq!(store.get(&title).await.as_deref(), Some("foo body"));
        }
    }

    #[tokio::test]
    async fn append() {
        let store = Arc::new(MemoryStore::with_pages([("foo", "A")]));
        let result = processor(&store).process(&edit(">>", "foo", "B")).await.unwrap();

        assert_eq!(result.to_string(), r#"success: appended to "foo""#);
        assert_eq!(store.get("foo").await.as_deref(), Some("A\nB"));
    }

    #[tokio::test]
    async fn prepend() {
        let store = Arc::new(MemoryStore::with_pages([("foo", "A")]));
        let result = processor(&store).process(&edit("<<", "foo", "B")).await.unwrap();

        assert_eq!(result.to_string(), r#"success: prepended to "foo""#);
        assert_eq!(store.get("foo").await.as_deref(), Some("B\nA"));
    }

    #[tokio::test]
    async fn insert_sorted_into_page() {
        let store = Arc::new(MemoryStore::with_pages([("foo", "asdf\nbar\nfoo\nmoo\n")]));
        let result = processor(&store)
            .process(&edit("<", "foo", "foo body"))
            .await
            .unwrap();

        assert_eq!(result.to_string(), r#"success: alphabetically inserted into "foo""#);
        assert_eq!(
            store.get("foo").await.as_deref(),
            Some("asdf\nbar\nfoo\nfoo body\nmoo\n")
        );
    }

    #[test]
    fn insert_sorted_orders_by_bytes() {
        assert_eq!(
            insert_sorted("asdf\nbar\nfoo\nmoo", "foo body"),
            "asdf\nbar\nfoo\nfoo body\nmoo"
        );
        // Uppercase sorts before lowercase.
        assert_eq!(insert_sorted("apple\nbanana", "Zebra"), "Zebra\napple\nbanana");
    }

    #[test]
    fn insert_sorted_appends_when_nothing_is_greater() {
        assert_eq!(insert_sorted("a\nb", "c"), "a\nb\nc");
        assert_eq!(insert_sorted("a\nb\n", "c"), "a\nb\n\nc");
        assert_eq!(insert_sorted("", "c"), "\nc");
    }

    #[test]
    fn insert_sorted_keeps_equal_lines_first() {
        assert_eq!(insert_sorted("a\nb\nc", "b"), "a\nb\nb\nc");
    }

    // ── Failures ────────────────────────────────────────────────────

    #[tokio::test]
    async fn unknown_operation_fails_without_touching_store() {
        let store = Arc::new(MemoryStore::new());
        store.fail_reads_for("foo").await;

        let results = processor(&store).apply(&[parse_segment("<>foo\nbar\n")]).await;

        assert_eq!(results.len(), 1);
        assert!(!results[0].is_success());
        assert!(results[0].message().contains("unrecognized edit marker"));
        assert!(results[0].message().ends_with("while processing this edit:\n<>foo\nbar\n"));
        assert!(store.titles().await.is_empty());
    }

    #[test]
    fn unknown_operation_never_computes_content() {
        let processor = processor(&Arc::new(MemoryStore::new()));
        let unknown = parse_segment("<>foo\nbar\n");

        for current in [None, Some("existing".to_string())] {
            let err = processor.new_content(&unknown, current).unwrap_err();
            assert!(matches!(err, EditError::UnknownOperation { .. }));
        }
    }

    #[tokio::test]
    async fn failure_message_embeds_error_and_segment() {
        let store = Arc::new(MemoryStore::new());
        store.fail_writes_for("foo").await;

        let results = processor(&store).apply(&[parse_segment(">foo\nbar\n")]).await;

        assert_eq!(
            results[0].to_string(),
            "failure: got error Store rejected write to \"foo\": injected write failure \
             while processing this edit:\n>foo\nbar\n"
        );
    }

    #[tokio::test]
    async fn failure_does_not_stop_later_edits() {
        let store = Arc::new(MemoryStore::new());
        store.fail_writes_for("two").await;

        let edits = [
            edit(">", "one", "1"),
            edit(">", "two", "2"),
            edit(">", "three", "3"),
        ];
        let results = processor(&store).apply(&edits).await;

        assert_eq!(results.len(), 3);
        assert!(results[0].is_success());
        assert!(!results[1].is_success());
        assert!(results[2].is_success());
        assert_eq!(store.get("one").await.as_deref(), Some("1"));
        assert_eq!(store.get("two").await, None);
        assert_eq!(store.get("three").await.as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn read_failure_is_treated_as_absent_by_default() {
        let store = Arc::new(MemoryStore::with_pages([("foo", "old")]));
        store.fail_reads_for("foo").await;

        let result = processor(&store).process(&edit(">>", "foo", "new")).await.unwrap();

        assert_eq!(result.to_string(), r#"success: created "foo""#);
        assert_eq!(store.get("foo").await.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn strict_reads_fail_the_edit() {
        let store = Arc::new(MemoryStore::with_pages([("foo", "old")]));
        store.fail_reads_for("foo").await;
        let options = ProcessorOptions {
            read_failures: ReadFailurePolicy::Fail,
            ..Default::default()
        };

        let processor = EditProcessor::with_options(Arc::clone(&store) as Arc<dyn ContentStore>, options);
        let err = processor.process(&edit(">>", "foo", "new")).await.unwrap_err();

        assert!(matches!(err, EditError::Store(_)));
        assert_eq!(store.get("foo").await.as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn combined_verbs() {
        let store = Arc::new(MemoryStore::with_pages([("old", "x")]));
        let options = ProcessorOptions {
            verb_style: VerbStyle::Combined,
            ..Default::default()
        };
        let processor = EditProcessor::with_options(Arc::clone(&store) as Arc<dyn ContentStore>, options);

        let results = processor
            .apply(&[edit(">", "old", "y"), edit(">", "new", "z"), edit(">>", "old", "w")])
            .await;

        let lines: Vec<String> = results.iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                r#"success: created/replaced "old""#,
                r#"success: created/replaced "new""#,
                r#"success: appended to "old""#,
            ]
        );
    }

    // ── Ordering ────────────────────────────────────────────────────

    #[tokio::test]
    async fn later_edits_see_earlier_writes() {
        let store = Arc::new(MemoryStore::new());
        let edits = [
            edit(">", "list", "b"),
            edit(">>", "list", "d"),
            edit("<", "list", "c"),
            edit("<<", "list", "a"),
        ];

        let results = processor(&store).apply(&edits).await;

        assert!(results.iter().all(EditResult::is_success));
        assert_eq!(store.get("list").await.as_deref(), Some("a\nb\nc\nd"));
    }
}
