use std::env::var;
use std::time::Duration;

use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use tracing::debug;

use issuestack::RawIssue;

static CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent("issuestack-chart")
        .build()
        .unwrap()
});

const PAGE_SIZE: u32 = 100;

/// Fixed pause between page fetches so we don't run into rate limiting.
const PAGE_DELAY: Duration = Duration::from_secs(5);

pub(crate) struct Config {
    token: Option<String>,
}

impl Config {
    /// Unauthenticated access works but hits rate limits much sooner.
    pub(crate) fn from_env() -> Self {
        Self {
            token: var("GITHUB_TOKEN").ok(),
        }
    }
}

fn issues_url(owner: &str, repo: &str, page: u32) -> String {
    format!(
        "https://api.github.com/repos/{owner}/{repo}/issues?state=all&sort=created&per_page={PAGE_SIZE}&page={page}"
    )
}

/// Fetch every issue of the repository, open and closed, page by page
/// until the API returns an empty page. Any failed fetch aborts the
/// whole run; there are no retries.
pub(crate) fn fetch_all_issues(
    config: &Config,
    owner: &str,
    repo: &str,
) -> Result<Vec<RawIssue>, reqwest::Error> {
    let mut issues = Vec::new();
    for page in 1.. {
        if page > 1 {
            std::thread::sleep(PAGE_DELAY);
        }
        let mut request = CLIENT.get(issues_url(owner, repo, page));
        if let Some(token) = &config.token {
            request = request.bearer_auth(token);
        }
        let page_issues: Vec<RawIssue> = request.send()?.error_for_status()?.json()?;
        if page_issues.is_empty() {
            break;
        }
        debug!(page, count = page_issues.len(), "fetched issue page");
        issues.extend(page_issues);
    }
    Ok(issues)
}

#[cfg(test)]
mod tests {
    #[test]
    fn issues_url_pages_through_all_issues() {
        assert_eq!(
            super::issues_url("OctoPi-Team", "OctoPi", 3),
            "https://api.github.com/repos/OctoPi-Team/OctoPi/issues?state=all&sort=created&per_page=100&page=3"
        );
    }
}
