use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ngtsc::logging::{LogLevel, UnknownLogLevel};

/// Options that control the ngtsc pipeline.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NgCompilerOptions {
    pub root_dir: Option<String>,
    pub root_dirs: Option<Vec<String>>,
    /// Type-check component templates against their component classes.
    pub full_template_type_check: bool,
    /// Mark emitted static fields `@nocollapse` for Closure Compiler.
    pub annotate_for_closure_compiler: bool,
    /// Default of `preserveWhitespaces` for components that don't set it.
    pub preserve_whitespaces: bool,
    pub enable_ivy: bool,
    /// Forward compiler progress to `tracing` at this level and above.
    pub log_level: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct TsConfig {
    compiler_options: NgCompilerOptions,
    angular_compiler_options: NgCompilerOptions,
}

impl NgCompilerOptions {
    /// Reads a tsconfig document. Angular options override compiler options
    /// of the same name.
    pub fn from_tsconfig_json(text: &str) -> anyhow::Result<Self> {
        let config: TsConfig = serde_json::from_str(text)?;
        let options = config.compiler_options.merge(config.angular_compiler_options);
        options.log_level()?;
        Ok(options)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_tsconfig_json(&content)
    }

    fn merge(self, other: NgCompilerOptions) -> Self {
        Self {
            root_dir: other.root_dir.or(self.root_dir),
            root_dirs: other.root_dirs.or(self.root_dirs),
            full_template_type_check: self.full_template_type_check || other.full_template_type_check,
            annotate_for_closure_compiler: self.annotate_for_closure_compiler
                || other.annotate_for_closure_compiler,
            preserve_whitespaces: self.preserve_whitespaces || other.preserve_whitespaces,
            enable_ivy: self.enable_ivy || other.enable_ivy,
            log_level: other.log_level.or(self.log_level),
        }
    }

    pub fn log_level(&self) -> Result<Option<LogLevel>, UnknownLogLevel> {
        self.log_level.as_deref().map(str::parse).transpose()
    }

    /// `rootDirs`, else `[rootDir]`, else `[current_dir]`.
    pub fn root_dirs(&self, current_dir: &str) -> Vec<String> {
        if let Some(root_dirs) = &self.root_dirs {
            return root_dirs.clone();
        }
        match &self.root_dir {
            Some(root_dir) => vec![root_dir.clone()],
            None => vec![current_dir.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_read_angular_compiler_options() {
        let options = NgCompilerOptions::from_tsconfig_json(
            r#"{
                "compilerOptions": {"rootDir": "/src", "target": "es2015"},
                "angularCompilerOptions": {"fullTemplateTypeCheck": true, "enableIvy": true}
            }"#,
        )
        .unwrap();
        assert_eq!(options.root_dir.as_deref(), Some("/src"));
        assert!(options.full_template_type_check);
        assert!(options.enable_ivy);
        assert!(!options.preserve_whitespaces);
    }

    #[test]
    fn should_compute_root_dirs() {
        let mut options = NgCompilerOptions::default();
        assert_eq!(options.root_dirs("/cwd"), vec!["/cwd".to_string()]);
        options.root_dir = Some("/src".into());
        assert_eq!(options.root_dirs("/cwd"), vec!["/src".to_string()]);
        options.root_dirs = Some(vec!["/a".into(), "/b".into()]);
        assert_eq!(options.root_dirs("/cwd"), vec!["/a".to_string(), "/b".to_string()]);
    }

    #[test]
    fn should_read_log_level() {
        let options = NgCompilerOptions::from_tsconfig_json(
            r#"{"angularCompilerOptions": {"logLevel": "info"}}"#,
        )
        .unwrap();
        assert_eq!(options.log_level(), Ok(Some(LogLevel::Info)));
        assert_eq!(NgCompilerOptions::default().log_level(), Ok(None));

        let err = NgCompilerOptions::from_tsconfig_json(
            r#"{"angularCompilerOptions": {"logLevel": "loud"}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown log level 'loud'"));
    }

    #[test]
    fn should_reject_malformed_json() {
        assert!(NgCompilerOptions::from_tsconfig_json("{").is_err());
    }
}
