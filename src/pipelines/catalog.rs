use std::collections::{BTreeMap, HashSet};

use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::error::{KickoffError, Result};

use super::classify::JobClassifier;
use super::server::BuildServer;
use super::types::JobRef;

pub const DEFAULT_MAX_DEPTH: usize = 32;

#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Keep only pipelines whose fully-qualified name contains this text
    pub filter: Option<String>,
    /// Nodes nested deeper than this are not fetched. Children the server
    /// already returned are still walked.
    pub max_depth: usize,
    /// Checked before every node
    pub cancel: CancellationToken,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            filter: None,
            max_depth: DEFAULT_MAX_DEPTH,
            cancel: CancellationToken::new(),
        }
    }
}

impl DiscoveryOptions {
    fn accepts(&self, full_name: &str) -> bool {
        match self.filter.as_deref() {
            None | Some("") => true,
            Some(filter) => full_name.contains(filter),
        }
    }
}

/// Flat view of every pipeline in the job tree, keyed by fully-qualified name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    jobs: BTreeMap<String, JobRef>,
}

impl Catalog {
    /// Lists the root jobs and flattens the tree below them.
    pub async fn discover(
        server: &dyn BuildServer,
        classifier: &dyn JobClassifier,
        options: &DiscoveryOptions,
    ) -> Result<Self> {
        let roots = server.list_root_jobs().await?;
        Self::discover_from(server, roots, classifier, options).await
    }

    /// Depth-first walk from `roots`, expanding unfetched nodes one at a time.
    ///
    /// A failed expansion drops that branch only. Nodes are identified by URL
    /// when the server reports one, otherwise by name; a node seen twice is not
    /// expanded again. Fails only when `options.cancel` fires.
    pub async fn discover_from(
        server: &dyn BuildServer,
        roots: Vec<JobRef>,
        classifier: &dyn JobClassifier,
        options: &DiscoveryOptions,
    ) -> Result<Self> {
        let mut jobs = BTreeMap::new();
        let mut visited = HashSet::new();
        let mut stack: Vec<(String, JobRef, usize)> = roots
            .into_iter()
            .rev()
            .map(|job| (String::new(), job, 0))
            .collect();

        while let Some((prefix, node, depth)) = stack.pop() {
            if options.cancel.is_cancelled() {
                return Err(KickoffError::Cancelled("pipeline discovery".to_string()));
            }

            let full_name = join_name(&prefix, &node.name);

            let identity = node.url.clone().unwrap_or_else(|| full_name.clone());
            if !visited.insert(identity) {
                warn!("Skipping {full_name}: already visited (cyclic job tree?)");
                continue;
            }

            let node = match node.children {
                Some(_) => node,
                None if depth > options.max_depth => {
                    warn!(
                        "Not expanding {full_name}: deeper than {} levels",
                        options.max_depth
                    );
                    node
                }
                None => expand(server, &full_name, node).await,
            };

            if classifier.is_pipeline(&node) && options.accepts(&full_name) {
                debug!("Found pipeline {full_name}");
                jobs.insert(
                    full_name.clone(),
                    JobRef {
                        name: full_name.clone(),
                        ..node.clone()
                    },
                );
            }

            if let Some(children) = node.children {
                stack.extend(
                    children
                        .into_iter()
                        .rev()
                        .map(|child| (full_name.clone(), child, depth + 1)),
                );
            }
        }

        info!("Discovered {} pipelines", jobs.len());

        Ok(Self { jobs })
    }

    pub fn get(&self, name: &str) -> Option<&JobRef> {
        self.jobs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.jobs.contains_key(name)
    }

    /// All pipeline names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.jobs.keys().cloned().collect()
    }

    pub fn jobs(&self) -> impl Iterator<Item = &JobRef> {
        self.jobs.values()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

impl FromIterator<JobRef> for Catalog {
    fn from_iter<T: IntoIterator<Item = JobRef>>(iter: T) -> Self {
        Self {
            jobs: iter.into_iter().map(|job| (job.name.clone(), job)).collect(),
        }
    }
}

fn join_name(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

/// Fetches the node's children. On failure the node is kept as a leaf with no children.
async fn expand(server: &dyn BuildServer, full_name: &str, node: JobRef) -> JobRef {
    debug!("Expanding {full_name}");
    match server.fetch_job(full_name).await {
        Ok(fetched) => JobRef {
            name: node.name,
            class: if fetched.class.is_empty() {
                node.class
            } else {
                fetched.class
            },
            url: node.url.or(fetched.url),
            children: fetched.children,
        },
        Err(e) => {
            warn!("Could not expand {full_name}, skipping its children: {e}");
            node
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipelines::classify::ClassMarker;
    use crate::pipelines::testing::{folder, pipeline, ScriptedServer};

    fn sample_tree() -> ScriptedServer {
        ScriptedServer::new()
            .with_roots(vec![folder("team1")])
            .with_job(
                "team1",
                folder("team1").with_children(vec![pipeline("service-a"), folder("nested")]),
            )
            .with_job("team1/service-a", pipeline("service-a"))
            .with_job(
                "team1/nested",
                folder("nested").with_children(vec![pipeline("service-b")]),
            )
            .with_job("team1/nested/service-b", pipeline("service-b"))
    }

    async fn discover(server: &ScriptedServer, options: &DiscoveryOptions) -> Catalog {
        Catalog::discover(server, &ClassMarker::default(), options)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn flattens_nested_folders_into_qualified_names() {
        let server = sample_tree();
        let catalog = discover(&server, &DiscoveryOptions::default()).await;

        assert_eq!(
            catalog.names(),
            vec!["team1/nested/service-b", "team1/service-a"]
        );
        assert_eq!(catalog.get("team1/service-a").unwrap().name, "team1/service-a");
        assert!(!catalog.contains("team1"));
        assert!(!catalog.contains("team1/nested"));
    }

    #[tokio::test]
    async fn discovery_is_idempotent_on_unchanged_tree() {
        let server = sample_tree();
        let first = discover(&server, &DiscoveryOptions::default()).await;
        let second = discover(&server, &DiscoveryOptions::default()).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn prefetched_children_are_not_fetched_again() {
        let server = ScriptedServer::new()
            .with_roots(vec![folder("team1").with_children(vec![
                pipeline("a").with_children(vec![]),
                pipeline("b").with_children(vec![]),
            ])]);

        let catalog = discover(&server, &DiscoveryOptions::default()).await;

        assert_eq!(catalog.names(), vec!["team1/a", "team1/b"]);
        assert_eq!(server.count_calls("fetch_job"), 0);
    }

    #[tokio::test]
    async fn unfetched_nodes_are_fetched_once_each() {
        let server = sample_tree();
        discover(&server, &DiscoveryOptions::default()).await;

        assert_eq!(
            server.calls(),
            vec![
                "list_root_jobs",
                "fetch_job team1",
                "fetch_job team1/service-a",
                "fetch_job team1/nested",
                "fetch_job team1/nested/service-b",
            ]
        );
    }

    #[tokio::test]
    async fn failed_folder_fetch_drops_only_that_branch() {
        let server = ScriptedServer::new()
            .with_roots(vec![folder("broken"), folder("ok")])
            .with_failing_job("broken")
            .with_job("ok", folder("ok").with_children(vec![pipeline("master")]))
            .with_job("ok/master", pipeline("master"));

        let catalog = discover(&server, &DiscoveryOptions::default()).await;

        assert_eq!(catalog.names(), vec!["ok/master"]);
    }

    #[tokio::test]
    async fn pipeline_whose_fetch_fails_is_still_listed() {
        let server = ScriptedServer::new()
            .with_roots(vec![pipeline("standalone")])
            .with_failing_job("standalone");

        let catalog = discover(&server, &DiscoveryOptions::default()).await;

        assert_eq!(catalog.names(), vec!["standalone"]);
    }

    #[tokio::test]
    async fn filter_matches_anywhere_in_qualified_name() {
        let server = sample_tree();
        let options = DiscoveryOptions {
            filter: Some("nested".to_string()),
            ..DiscoveryOptions::default()
        };

        let catalog = discover(&server, &options).await;

        assert_eq!(catalog.names(), vec!["team1/nested/service-b"]);
    }

    #[tokio::test]
    async fn empty_filter_keeps_everything() {
        let server = sample_tree();
        let options = DiscoveryOptions {
            filter: Some(String::new()),
            ..DiscoveryOptions::default()
        };

        assert_eq!(discover(&server, &options).await.len(), 2);
    }

    #[tokio::test]
    async fn self_referential_folder_terminates() {
        let looping = folder("loop")
            .with_url("https://ci.example.com/job/loop/")
            .with_children(vec![
                folder("loop").with_url("https://ci.example.com/job/loop/"),
                pipeline("inside").with_children(vec![]),
            ]);
        let server = ScriptedServer::new().with_roots(vec![looping]);

        let catalog = discover(&server, &DiscoveryOptions::default()).await;

        assert_eq!(catalog.names(), vec!["loop/inside"]);
        assert_eq!(server.count_calls("fetch_job"), 0);
    }

    #[tokio::test]
    async fn unbounded_nesting_stops_at_max_depth() {
        // Every fetch of a folder returns yet another unfetched folder.
        let mut server = ScriptedServer::new().with_roots(vec![folder("f")]);
        let mut name = "f".to_string();
        for _ in 0..10 {
            server = server.with_job(&name, folder("f").with_children(vec![folder("f")]));
            name.push_str("/f");
        }
        let options = DiscoveryOptions {
            max_depth: 3,
            ..DiscoveryOptions::default()
        };

        let catalog = discover(&server, &options).await;

        assert!(catalog.is_empty());
        assert_eq!(server.count_calls("fetch_job"), 4);
    }

    #[tokio::test]
    async fn prefetched_pipeline_past_max_depth_is_listed() {
        let server = ScriptedServer::new().with_roots(vec![folder("a").with_children(vec![
            folder("b").with_children(vec![pipeline("c").with_children(vec![])]),
        ])]);
        let options = DiscoveryOptions {
            max_depth: 1,
            ..DiscoveryOptions::default()
        };

        let catalog = discover(&server, &options).await;

        assert_eq!(catalog.names(), vec!["a/b/c"]);
        assert_eq!(server.count_calls("fetch_job"), 0);
    }

    #[tokio::test]
    async fn unfetched_pipeline_past_max_depth_is_listed_without_fetch() {
        let server = ScriptedServer::new()
            .with_roots(vec![folder("a").with_children(vec![pipeline("deep")])]);
        let options = DiscoveryOptions {
            max_depth: 0,
            ..DiscoveryOptions::default()
        };

        let catalog = discover(&server, &options).await;

        assert_eq!(catalog.names(), vec!["a/deep"]);
        assert_eq!(server.count_calls("fetch_job"), 0);
    }

    #[tokio::test]
    async fn cancelled_discovery_stops_fetching() {
        let server = sample_tree();
        let options = DiscoveryOptions::default();
        options.cancel.cancel();

        let err = Catalog::discover(&server, &ClassMarker::default(), &options)
            .await
            .unwrap_err();

        assert!(matches!(err, KickoffError::Cancelled(_)));
        assert_eq!(server.calls(), vec!["list_root_jobs"]);
    }

    #[tokio::test]
    async fn root_listing_failure_is_an_error() {
        struct Down;

        #[async_trait::async_trait]
        impl BuildServer for Down {
            async fn list_root_jobs(&self) -> Result<Vec<JobRef>> {
                Err(crate::error::KickoffError::Api {
                    status: 503,
                    message: "down".to_string(),
                })
            }
            async fn fetch_job(&self, _: &str) -> Result<JobRef> {
                unreachable!()
            }
            async fn last_build(&self, _: &JobRef) -> Result<crate::pipelines::BuildRef> {
                unreachable!()
            }
            async fn trigger_build(
                &self,
                _: &JobRef,
                _: &std::collections::BTreeMap<String, String>,
            ) -> Result<()> {
                unreachable!()
            }
            async fn stream_console_log(
                &self,
                _: &str,
                _: crate::pipelines::LogSink<'_>,
                _: std::time::Duration,
                _: std::time::Duration,
                _: &tokio_util::sync::CancellationToken,
            ) -> Result<()> {
                unreachable!()
            }
            fn name(&self) -> &str {
                "down"
            }
        }

        let result =
            Catalog::discover(&Down, &ClassMarker::default(), &DiscoveryOptions::default()).await;
        assert!(result.is_err());
    }
}
