use url::Url;

use crate::error::{KickoffError, Result};

/// Parses a Jenkins base URL, making sure it ends with `/` so relative joins
/// stay below it (e.g. `https://ci.example.com/jenkins` keeps `/jenkins/`).
pub fn base_url(raw: &str) -> Result<Url> {
    let mut url =
        Url::parse(raw).map_err(|e| KickoffError::Config(format!("Invalid base URL: {e}")))?;

    if url.cannot_be_a_base() {
        return Err(KickoffError::Config(format!("Invalid base URL: {raw}")));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Address of a job from its fully-qualified name.
///
/// Jenkins nests folders as `job/<folder>/job/<name>/`; each segment is
/// percent-encoded.
pub fn job_url(base: &Url, full_name: &str) -> Result<Url> {
    let mut url = base.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| KickoffError::InvalidUrl(base.to_string()))?;
        segments.pop_if_empty();
        for part in full_name.split('/').filter(|p| !p.is_empty()) {
            segments.push("job").push(part);
        }
        segments.push("");
    }
    Ok(url)
}

/// `api/json` of `resource`, optionally narrowed with a `tree` filter.
pub fn api_url(resource: &Url, tree: Option<&str>) -> Result<Url> {
    let mut url = join(resource, "api/json")?;
    if let Some(tree) = tree {
        url.query_pairs_mut().append_pair("tree", tree);
    }
    Ok(url)
}

/// Progressive console text of the build living at server path `build_path`.
pub fn console_text_url(base: &Url, build_path: &str) -> Result<Url> {
    let mut build = join(base, build_path)?;
    if !build.path().ends_with('/') {
        let path = format!("{}/", build.path());
        build.set_path(&path);
    }
    join(&build, "logText/progressiveText")
}

pub fn join(url: &Url, path: &str) -> Result<Url> {
    url.join(path)
        .map_err(|e| KickoffError::InvalidUrl(format!("{url} + {path}: {e}")))
}
