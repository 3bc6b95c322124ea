use super::types::JobRef;

/// Decides whether a job-tree node is a buildable pipeline.
pub trait JobClassifier: Send + Sync {
    fn is_pipeline(&self, job: &JobRef) -> bool;
}

impl<F> JobClassifier for F
where
    F: Fn(&JobRef) -> bool + Send + Sync,
{
    fn is_pipeline(&self, job: &JobRef) -> bool {
        self(job)
    }
}

/// Matches when the node's class contains any of the configured markers.
///
/// Jenkins workflow jobs report classes like
/// `org.jenkinsci.plugins.workflow.job.WorkflowJob`, while folders report
/// `com.cloudbees.hudson.plugins.folder.Folder` or
/// `jenkins.branch.OrganizationFolder`, so the default marker is `Job`.
#[derive(Debug, Clone)]
pub struct ClassMarker {
    markers: Vec<String>,
}

impl ClassMarker {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(Into::into)
                .filter(|m: &String| !m.is_empty())
                .collect(),
        }
    }
}

impl Default for ClassMarker {
    fn default() -> Self {
        Self::new(["Job"])
    }
}

impl JobClassifier for ClassMarker {
    fn is_pipeline(&self, job: &JobRef) -> bool {
        self.markers.iter().any(|m| job.class.contains(m.as_str()))
    }
}
