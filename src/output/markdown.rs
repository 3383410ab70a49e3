//! Markdown report generation
//!
//! Renders the harvest as a weekly-review style post: a heading with the
//! window, the headline numbers, then one top-N table per post type followed
//! by the community and user tables.

use crate::output::ranking::{top_communities, top_posts_by_type, top_users, EngagementRow};
use crate::output::stats::ReportStats;
use crate::output::traits::{OutputHandler, OutputResult, ReportContext};
use crate::store::RecordStore;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes the markdown report to a file
pub struct MarkdownReport {
    path: PathBuf,
}

impl MarkdownReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OutputHandler for MarkdownReport {
    fn name(&self) -> &str {
        "markdown report"
    }

    fn write(&self, store: &RecordStore, ctx: &ReportContext) -> OutputResult<()> {
        generate_markdown_report(store, ctx, &self.path)
    }
}

/// Generates the markdown report and writes it to `output_path`
///
/// # Arguments
///
/// * `store` - The finished harvest
/// * `ctx` - Window, links and display parameters
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to write the report
pub fn generate_markdown_report(
    store: &RecordStore,
    ctx: &ReportContext,
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_markdown_report(store, ctx);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats the harvest as markdown
pub fn format_markdown_report(store: &RecordStore, ctx: &ReportContext) -> String {
    let stats = ReportStats::from_store(store);
    let mut md = String::new();

    md.push_str(&format!("# Discuit week in review: {}\n\n", ctx.window));

    if let Some(url) = &ctx.last_report_url {
        md.push_str(&format!("[Last week's report is here]({}).\n\n", url));
    }

    md.push_str(&format!(
        "{} users discussed {} posts in {} comments over {} total discs.",
        stats.active_users, stats.active_posts, stats.comments, stats.communities
    ));
    if let Some(accounts) = ctx.registered_users {
        md.push_str(&format!(
            " At the time of this report, there were {} accounts.",
            accounts
        ));
    }
    md.push_str("\n\n");

    for (post_type, rows) in top_posts_by_type(store, ctx.top_n) {
        if rows.is_empty() {
            continue;
        }
        md.push_str(&format!(
            "## Top {} most engaging {}s\n\n",
            ctx.top_n, post_type
        ));
        let body: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                vec![
                    row.rank.to_string(),
                    row.community.clone(),
                    format!(
                        "[{}]({}/{}/post/{})",
                        row.title, ctx.base_url, row.community, row.public_id
                    ),
                    escape_username(&row.username),
                    row.comments.to_string(),
                ]
            })
            .collect();
        md.push_str(&markdown_table(
            &["Rank", "Disc", "Title", "User", "Comments"],
            &body,
        ));
        md.push('\n');
    }

    let communities = top_communities(store, &ctx.window, ctx.top_n);
    md.push_str(&format!("## Top {} most engaging Discs\n\n", ctx.top_n));
    md.push_str(&engagement_table("Disc", &communities, |name| {
        format!("[{}]({}/{})", name, ctx.base_url, name)
    }));
    md.push('\n');

    let users = top_users(store, &ctx.window, ctx.top_n);
    md.push_str(&format!("## Top {} most engaged Discuiteers\n\n", ctx.top_n));
    md.push_str(&engagement_table("User", &users, |name| {
        format!("[{}]({}/@{})", escape_username(name), ctx.base_url, name)
    }));

    md
}

fn engagement_table(label: &str, rows: &[EngagementRow], link: impl Fn(&str) -> String) -> String {
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                row.rank.to_string(),
                link(&row.name),
                row.texts.to_string(),
                row.images.to_string(),
                row.links.to_string(),
                row.total_posts.to_string(),
                row.comments.to_string(),
                row.total_engagement().to_string(),
            ]
        })
        .collect();

    markdown_table(
        &[
            "Rank",
            label,
            "Texts",
            "Images",
            "Links",
            "TotalPosts",
            "Comments",
            "TotalEngagement",
        ],
        &body,
    )
}

fn markdown_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut table = String::new();
    table.push_str(&format!("| {} |\n", headers.join(" | ")));
    table.push_str(&format!(
        "|{}|\n",
        headers.iter().map(|_| "---").collect::<Vec<_>>().join("|")
    ));
    for row in rows {
        table.push_str(&format!("| {} |\n", row.join(" | ")));
    }
    table
}

fn escape_username(name: &str) -> String {
    name.replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{Comment, PostSummary, PostType};
    use crate::store::{CommentRecord, PostRecord};
    use crate::window::{DateBucket, DateWindow};
    use chrono::DateTime;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn create_test_context() -> ReportContext {
        ReportContext {
            window: DateWindow::new(
                DateBucket::parse_compact("20240816"),
                DateBucket::parse_compact("20240823"),
            ),
            base_url: "https://discuit.example".to_string(),
            top_n: 10,
            last_report_url: Some("https://discuit.example/report/last".to_string()),
            registered_users: Some(4200),
        }
    }

    fn create_test_store() -> RecordStore {
        let ignored = HashSet::new();
        let post = PostSummary {
            public_id: "abc123".to_string(),
            community_name: "general".to_string(),
            username: "night_owl".to_string(),
            title: "Hello (world)".to_string(),
            post_type: PostType::Text,
            created_at: DateTime::parse_from_rfc3339("2024-08-20T00:00:00Z").unwrap(),
            last_activity_at: DateTime::parse_from_rfc3339("2024-08-21T00:00:00Z").unwrap(),
            comment_count: 1,
        };
        let comment = Comment {
            id: "c1".to_string(),
            username: "alice".to_string(),
            created_at: DateTime::parse_from_rfc3339("2024-08-21T00:00:00Z").unwrap(),
            edited_at: None,
            deleted_at: None,
        };

        let mut store = RecordStore::new();
        store.upsert_post(PostRecord::from_summary(&post, &ignored));
        store.insert_comment(CommentRecord::new(&post, &comment, &ignored));
        store
    }

    #[test]
    fn test_format_markdown_report() {
        let md = format_markdown_report(&create_test_store(), &create_test_context());

        assert!(md.starts_with("# Discuit week in review: 20240816-20240823\n"));
        assert!(md.contains("[Last week's report is here](https://discuit.example/report/last)"));
        assert!(md.contains("2 users discussed 1 posts in 1 comments over 1 total discs."));
        assert!(md.contains("there were 4200 accounts"));
        assert!(md.contains("## Top 10 most engaging Texts"));
        assert!(md.contains(
            "| 1 | general | [Hello \\(world\\)](https://discuit.example/general/post/abc123) | night\\_owl | 1 |"
        ));
        assert!(md.contains("| 1 | [general](https://discuit.example/general) | 1 | 0 | 0 | 1 | 1 | 2 |"));
        assert!(md.contains("[night\\_owl](https://discuit.example/@night_owl)"));
    }

    #[test]
    fn test_empty_store_still_renders_headings() {
        let mut ctx = create_test_context();
        ctx.last_report_url = None;
        ctx.registered_users = None;

        let md = format_markdown_report(&RecordStore::new(), &ctx);

        assert!(!md.contains("Last week"));
        assert!(md.contains("0 users discussed 0 posts in 0 comments over 0 total discs.\n"));
        assert!(md.contains("## Top 10 most engaging Discs"));
        assert!(md.contains("## Top 10 most engaged Discuiteers"));
    }

    #[test]
    fn test_markdown_report_writes_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("summary.md");

        let handler = MarkdownReport::new(&path);
        handler
            .write(&create_test_store(), &create_test_context())
            .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("Discuit week in review"));
    }

    #[test]
    fn test_markdown_table_shape() {
        let table = markdown_table(&["A", "B"], &[vec!["1".to_string(), "x".to_string()]]);
        assert_eq!(table, "| A | B |\n|---|---|\n| 1 | x |\n");
    }
}
