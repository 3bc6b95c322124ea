use std::collections::BTreeMap;

use log::{debug, info};

use crate::error::{KickoffError, Result};
use crate::pipelines::{BuildRef, JobRef};
use crate::providers::jenkins::links;
use crate::providers::jenkins::types::{Crumb, JenkinsBuild};

use super::core::{api_error, is_not_found, JenkinsClient};

const BUILD_TREE: &str = "number,url,building,result";

impl JenkinsClient {
    pub async fn fetch_last_build(&self, job: &JobRef) -> Result<BuildRef> {
        let job_url = links::job_url(&self.base_url, &job.name)?;
        let url = links::api_url(&links::join(&job_url, "lastBuild/")?, Some(BUILD_TREE))?;

        match self.get_json::<JenkinsBuild>(&url).await {
            Ok(build) => Ok(build.into()),
            Err(e) if is_not_found(&e) => Err(KickoffError::NoBuild(job.name.clone())),
            Err(e) => Err(e),
        }
    }

    /// CSRF crumb, or `None` when the instance has crumb issuing disabled.
    pub async fn fetch_crumb(&self) -> Result<Option<Crumb>> {
        let url = links::api_url(&links::join(&self.base_url, "crumbIssuer/")?, None)?;

        match self.get_json::<Crumb>(&url).await {
            Ok(crumb) => Ok(Some(crumb)),
            Err(e) if is_not_found(&e) => {
                debug!("Crumb issuer disabled, triggering without crumb");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Queues a build. Sent once: a failed trigger is never retried.
    pub async fn start_build(&self, job: &JobRef, params: &BTreeMap<String, String>) -> Result<()> {
        let job_url = links::job_url(&self.base_url, &job.name)?;
        let endpoint = if params.is_empty() {
            "build"
        } else {
            "buildWithParameters"
        };
        let url = links::join(&job_url, endpoint)?;

        let mut request = self.auth_request(self.client.post(url)).form(params);
        if let Some(crumb) = self.fetch_crumb().await? {
            request = request.header(crumb.crumb_request_field.as_str(), crumb.crumb.as_str());
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        info!("Queued build of {} (status {})", job.name, response.status());
        Ok(())
    }
}
