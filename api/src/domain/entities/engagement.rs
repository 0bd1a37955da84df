//! Team engagement aggregation
//!
//! Rolls a flat event list up into per-population engagement ratios over
//! the distinct issues and pull requests touched in the window. An item
//! counts toward its totals exactly once no matter how many events hit it.

use std::collections::HashMap;

use serde::Serialize;

use super::event::{ContributionEvent, EventDetail, TargetKind};

/// The set of logins considered "team" for engagement purposes.
/// Comparison is case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct TeamRoster {
    members: Vec<String>,
}

impl TeamRoster {
    pub fn new<I, S>(logins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut members: Vec<String> = logins
            .into_iter()
            .map(|l| l.into().trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .collect();
        members.sort();
        members.dedup();
        Self { members }
    }

    pub fn contains(&self, login: &str) -> bool {
        self.members
            .binary_search(&login.trim().to_lowercase())
            .is_ok()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn logins(&self) -> &[String] {
        &self.members
    }
}

/// Engagement of one population with one item type
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EngagementStat {
    pub total_items: usize,
    pub touched: usize,
    pub ratio: f64,
}

impl EngagementStat {
    pub fn new(total_items: usize, touched: usize) -> Self {
        let ratio = if total_items == 0 {
            0.0
        } else {
            touched as f64 / total_items as f64
        };
        Self {
            total_items,
            touched,
            ratio,
        }
    }
}

/// One population's engagement across both item types
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PopulationEngagement {
    pub issue: EngagementStat,
    pub pr: EngagementStat,
}

/// Close-resolution split for issues in the window
#[derive(Debug, Clone, Copy, Serialize)]
pub struct IssueOutcomes {
    pub manually_closed: usize,
    pub pr_triggered_closed: usize,
    pub closed_ratio: f64,
}

/// Merge/close split for pull requests in the window
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PrOutcomes {
    pub merged: usize,
    pub closed: usize,
    pub finish_ratio: f64,
}

/// A touched item, summarized for the engaged/unattended listings
#[derive(Debug, Clone, Serialize)]
pub struct ItemSummary {
    pub number: i64,
    pub title: String,
    pub url: String,
    pub author: String,
    pub state: String,
}

/// Full team-mode aggregation result
#[derive(Debug, Clone, Serialize)]
pub struct TeamEngagement {
    pub team: PopulationEngagement,
    pub contributors: PopulationEngagement,
    pub issue_outcomes: IssueOutcomes,
    pub pr_outcomes: PrOutcomes,
    pub engaged_issues: Vec<ItemSummary>,
    pub unattended_issues: Vec<ItemSummary>,
    pub engaged_prs: Vec<ItemSummary>,
    pub unattended_prs: Vec<ItemSummary>,
}

#[derive(Default)]
struct ItemAcc {
    title: String,
    url: String,
    opener: String,
    team_touched: bool,
    contributor_touched: bool,
    manual_close: bool,
    merge_close: bool,
    merged: bool,
    closed: bool,
}

impl TeamEngagement {
    /// Pure rollup over a classified-or-not event list; events need no
    /// pre-classification here, every event is a "touch".
    pub fn from_events(events: &[ContributionEvent], roster: &TeamRoster) -> Self {
        // First-seen order keeps the engaged/unattended listings stable.
        let mut order: Vec<(TargetKind, i64)> = Vec::new();
        let mut items: HashMap<(TargetKind, i64), ItemAcc> = HashMap::new();

        for event in events {
            let key = event.item_key();
            let acc = items.entry(key).or_insert_with(|| {
                order.push(key);
                ItemAcc::default()
            });
            if acc.title.is_empty() {
                acc.title = event.target_title.clone();
            }
            if acc.url.is_empty() {
                acc.url = event.target_url.clone();
            }

            if roster.contains(&event.author_login) {
                acc.team_touched = true;
            } else {
                acc.contributor_touched = true;
            }

            match &event.detail {
                EventDetail::Opened => acc.opener = event.author_login.clone(),
                EventDetail::Closed { via_merge, .. } => match event.target_kind {
                    TargetKind::Issue => {
                        if *via_merge {
                            acc.merge_close = true;
                        } else {
                            acc.manual_close = true;
                        }
                    }
                    TargetKind::PullRequest => {
                        if *via_merge {
                            acc.merged = true;
                        } else {
                            acc.closed = true;
                        }
                    }
                },
                EventDetail::Merged { .. } => {
                    if event.target_kind == TargetKind::PullRequest {
                        acc.merged = true;
                    }
                }
                _ => {}
            }
        }

        let mut total_issues = 0;
        let mut total_prs = 0;
        let mut team_issues = 0;
        let mut team_prs = 0;
        let mut contrib_issues = 0;
        let mut contrib_prs = 0;
        let mut manually_closed = 0;
        let mut pr_triggered_closed = 0;
        let mut prs_merged = 0;
        let mut prs_closed = 0;

        let mut engaged_issues = Vec::new();
        let mut unattended_issues = Vec::new();
        let mut engaged_prs = Vec::new();
        let mut unattended_prs = Vec::new();

        for key in &order {
            let acc = &items[key];
            let (kind, number) = *key;
            let state = match kind {
                TargetKind::Issue => String::new(),
                TargetKind::PullRequest => {
                    if acc.merged {
                        "MERGED".to_string()
                    } else if acc.closed {
                        "CLOSED".to_string()
                    } else {
                        "OPEN".to_string()
                    }
                }
            };
            let summary = ItemSummary {
                number,
                title: acc.title.clone(),
                url: acc.url.clone(),
                author: acc.opener.clone(),
                state,
            };

            match kind {
                TargetKind::Issue => {
                    total_issues += 1;
                    if acc.team_touched {
                        team_issues += 1;
                        engaged_issues.push(summary);
                    } else {
                        unattended_issues.push(summary);
                    }
                    if acc.contributor_touched {
                        contrib_issues += 1;
                    }
                    // A reopened-then-closed-again issue counts once, under
                    // its manual close if it ever had one.
                    if acc.manual_close {
                        manually_closed += 1;
                    } else if acc.merge_close {
                        pr_triggered_closed += 1;
                    }
                }
                TargetKind::PullRequest => {
                    total_prs += 1;
                    if acc.team_touched {
                        team_prs += 1;
                        engaged_prs.push(summary);
                    } else {
                        unattended_prs.push(summary);
                    }
                    if acc.contributor_touched {
                        contrib_prs += 1;
                    }
                    if acc.merged {
                        prs_merged += 1;
                    } else if acc.closed {
                        prs_closed += 1;
                    }
                }
            }
        }

        let ratio = |n: usize, total: usize| {
            if total == 0 {
                0.0
            } else {
                n as f64 / total as f64
            }
        };

        Self {
            team: PopulationEngagement {
                issue: EngagementStat::new(total_issues, team_issues),
                pr: EngagementStat::new(total_prs, team_prs),
            },
            contributors: PopulationEngagement {
                issue: EngagementStat::new(total_issues, contrib_issues),
                pr: EngagementStat::new(total_prs, contrib_prs),
            },
            issue_outcomes: IssueOutcomes {
                manually_closed,
                pr_triggered_closed,
                closed_ratio: ratio(manually_closed + pr_triggered_closed, total_issues),
            },
            pr_outcomes: PrOutcomes {
                merged: prs_merged,
                closed: prs_closed,
                finish_ratio: ratio(prs_merged + prs_closed, total_prs),
            },
            engaged_issues,
            unattended_issues,
            engaged_prs,
            unattended_prs,
        }
    }
}
