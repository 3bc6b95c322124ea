/// A node in the build server's job tree.
///
/// `name` is the fully-qualified, `/`-joined path once the node has been placed
/// in the tree (the server itself only hands out the last segment).
/// `children` distinguishes "not fetched yet" (`None`) from "no children" (`Some(vec![])`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRef {
    pub name: String,
    /// Opaque server type tag (e.g. `org.jenkinsci.plugins.workflow.job.WorkflowJob`)
    pub class: String,
    /// Server-side address of the node, when the server reports one
    pub url: Option<String>,
    pub children: Option<Vec<JobRef>>,
}

impl JobRef {
    pub fn new(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: class.into(),
            url: None,
            children: None,
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<JobRef>) -> Self {
        self.children = Some(children);
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Last `/`-separated segment of the name.
    pub fn short_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildState {
    #[default]
    Unknown,
    Running,
    Complete,
}

/// One execution of a pipeline job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRef {
    /// Strictly increasing per job; 0 means "no build observed"
    pub number: u64,
    pub url: String,
    pub state: BuildState,
}

impl BuildRef {
    /// Stand-in for the last build of a job that has never built.
    pub fn none() -> Self {
        Self {
            number: 0,
            url: String::new(),
            state: BuildState::Unknown,
        }
    }

    pub fn is_none(&self) -> bool {
        self.number == 0
    }
}

/// The build a trigger call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildHandle {
    pub job_name: String,
    pub build: BuildRef,
}

impl BuildHandle {
    /// Browser address of the console page.
    pub fn console_url(&self) -> String {
        format!("{}/console", self.build.url.trim_end_matches('/'))
    }
}
