mod jenkins;

pub use jenkins::JenkinsProvider;
