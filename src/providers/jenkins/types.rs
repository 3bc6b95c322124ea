use serde::Deserialize;

use crate::pipelines::{BuildRef, BuildState, JobRef};

/// Top-level `api/json` response of a Jenkins instance.
#[derive(Debug, Deserialize)]
pub struct JenkinsRoot {
    #[serde(default)]
    pub jobs: Vec<JenkinsJob>,
}

/// A job or folder as returned by `api/json`.
///
/// `jobs` is only present for containers whose children were included in the
/// `tree` query.
#[derive(Debug, Deserialize)]
pub struct JenkinsJob {
    #[serde(rename = "_class", default)]
    pub class: String,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub jobs: Option<Vec<JenkinsJob>>,
}

impl From<JenkinsJob> for JobRef {
    fn from(job: JenkinsJob) -> Self {
        JobRef {
            name: job.name,
            class: job.class,
            url: job.url,
            children: job
                .jobs
                .map(|jobs| jobs.into_iter().map(JobRef::from).collect()),
        }
    }
}

/// `lastBuild/api/json` response.
#[derive(Debug, Deserialize)]
pub struct JenkinsBuild {
    pub number: u64,
    pub url: String,
    #[serde(default)]
    pub building: bool,
    #[serde(default)]
    pub result: Option<String>,
}

impl From<JenkinsBuild> for BuildRef {
    fn from(build: JenkinsBuild) -> Self {
        let state = if build.building {
            BuildState::Running
        } else if build.result.is_some() {
            BuildState::Complete
        } else {
            BuildState::Unknown
        };

        BuildRef {
            number: build.number,
            url: build.url,
            state,
        }
    }
}

/// CSRF crumb from `crumbIssuer/api/json`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crumb {
    pub crumb: String,
    pub crumb_request_field: String,
}
