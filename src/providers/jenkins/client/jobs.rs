use crate::error::{KickoffError, Result};
use crate::pipelines::JobRef;
use crate::providers::jenkins::links;
use crate::providers::jenkins::types::{JenkinsJob, JenkinsRoot};

use super::core::{is_not_found, JenkinsClient};

/// Children are requested one level deep only; deeper folders stay unexpanded.
const ROOT_TREE: &str = "jobs[name,url]";
const JOB_TREE: &str = "name,url,jobs[name,url]";

impl JenkinsClient {
    pub async fn fetch_root_jobs(&self) -> Result<Vec<JobRef>> {
        let url = links::api_url(&self.base_url, Some(ROOT_TREE))?;
        let root: JenkinsRoot = self.get_json(&url).await?;

        Ok(root.jobs.into_iter().map(JobRef::from).collect())
    }

    /// Fetches one job by fully-qualified name. The returned `JobRef` carries the
    /// short name Jenkins reports; callers keep track of the full path.
    pub async fn fetch_job_by_name(&self, full_name: &str) -> Result<JobRef> {
        let job_url = links::job_url(&self.base_url, full_name)?;
        let url = links::api_url(&job_url, Some(JOB_TREE))?;

        let job: JenkinsJob = self.get_json(&url).await.map_err(|e| {
            if is_not_found(&e) {
                KickoffError::JobNotFound(full_name.to_string())
            } else {
                e
            }
        })?;

        let mut job = JobRef::from(job);
        // Leaves come back without a `jobs` field; the fetch itself settles that
        // they have no children.
        job.children.get_or_insert_with(Vec::new);
        Ok(job)
    }
}
