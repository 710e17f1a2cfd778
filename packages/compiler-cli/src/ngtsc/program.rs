// ngtsc Program
//
// Ties the pipeline together for a whole program: builds the decorator
// handlers, analyzes every source file once, and emits the sources with
// their Ivy definitions.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use ts::{Diagnostic, FileId, Program};

use crate::config::NgCompilerOptions;
use crate::ngtsc::annotations::common::AnalysisContext;
use crate::ngtsc::annotations::{
    BaseDefDecoratorHandler, ComponentDecoratorHandler, DirectiveDecoratorHandler, InjectableDecoratorHandler,
    NgModuleDecoratorHandler, PipeDecoratorHandler,
};
use crate::ngtsc::imports::{get_r3_symbols_file, is_angular_core_package};
use crate::ngtsc::logging::{Logger, NullLogger, TracingLogger};
use crate::ngtsc::reflection::ReflectionHost;
use crate::ngtsc::resource::{FileResourceLoader, HostResourceLoader, ResourceHost, ResourceLoader};
use crate::ngtsc::transform::{transform_ivy_source_file, DecoratorHandler, IvyCompilation};
use crate::ngtsc::typecheck::TypeCheckContext;

static DEFINITION_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^(\s*)(static (?:ngBaseDef|ngComponentDef|ngDirectiveDef|ngInjectableDef|ngInjectorDef|ngModuleDef|ngPipeDef) = )",
    )
    .unwrap()
});

/// The external type checker that reports errors in type-checking code.
pub trait TypeCheckOracle {
    /// Diagnostics of the program made of `files`, as `(file name, text)`.
    fn semantic_diagnostics(&self, files: &[(String, String)]) -> Vec<Diagnostic>;
}

/// A file produced by `emit`.
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedFile {
    pub file_name: String,
    pub text: String,
}

pub struct NgtscProgram<'a> {
    program: &'a Program,
    reflector: &'a dyn ReflectionHost,
    options: NgCompilerOptions,
    root_dirs: Vec<String>,
    resource_loader: Arc<dyn ResourceLoader>,
    logger: Arc<dyn Logger>,
    is_core: bool,
    core_imports_from: Option<String>,
    compilation: Option<IvyCompilation<'a>>,
}

impl<'a> NgtscProgram<'a> {
    /// `current_dir` is the root directory when the options name none.
    pub fn new(
        program: &'a Program,
        reflector: &'a dyn ReflectionHost,
        options: NgCompilerOptions,
        current_dir: &str,
    ) -> Self {
        let root_dirs = options.root_dirs(current_dir);
        let logger: Arc<dyn Logger> = match options.log_level() {
            Ok(Some(level)) => Arc::new(TracingLogger::new(level)),
            _ => Arc::new(NullLogger::new()),
        };
        let is_core = is_angular_core_package(program);
        let core_imports_from = if is_core {
            get_r3_symbols_file(program).map(|file| file.file_name.clone())
        } else {
            None
        };
        Self {
            program,
            reflector,
            options,
            root_dirs,
            resource_loader: Arc::new(FileResourceLoader::new()),
            logger,
            is_core,
            core_imports_from,
            compilation: None,
        }
    }

    /// Read component resources through `host` instead of the file system.
    pub fn with_resource_host(mut self, host: Arc<dyn ResourceHost>) -> Self {
        self.resource_loader = Arc::new(HostResourceLoader::new(host));
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn is_core(&self) -> bool {
        self.is_core
    }

    pub fn root_dirs(&self) -> &[String] {
        &self.root_dirs
    }

    fn make_compilation(&self) -> IvyCompilation<'a> {
        let ctx = AnalysisContext::new(self.program, self.reflector, self.is_core);
        let handlers: Vec<Box<dyn DecoratorHandler<'a> + 'a>> = vec![
            Box::new(BaseDefDecoratorHandler::new(ctx)),
            Box::new(ComponentDecoratorHandler::new(
                ctx,
                self.resource_loader.clone(),
                self.root_dirs.clone(),
                self.options.preserve_whitespaces,
            )),
            Box::new(DirectiveDecoratorHandler::new(ctx)),
            Box::new(InjectableDecoratorHandler::new(ctx)),
            Box::new(NgModuleDecoratorHandler::new(ctx)),
            Box::new(PipeDecoratorHandler::new(ctx)),
        ];
        IvyCompilation::new(
            handlers,
            self.program,
            self.reflector,
            self.core_imports_from.clone(),
            self.logger.clone(),
        )
    }

    fn source_files(&self) -> Vec<FileId> {
        self.program
            .source_files()
            .iter()
            .filter(|file| !file.is_declaration_file())
            .map(|file| file.id)
            .collect()
    }

    /// Analyze the program, loading every resource up front and
    /// concurrently. Does nothing once the program is analyzed.
    pub fn load_ng_structure_async(&mut self) -> anyhow::Result<()> {
        if self.compilation.is_some() {
            return Ok(());
        }
        let mut compilation = self.make_compilation();
        compilation.analyze_async(&self.source_files())?;
        self.compilation = Some(compilation);
        Ok(())
    }

    fn ensure_analyzed(&mut self) -> anyhow::Result<&mut IvyCompilation<'a>> {
        if self.compilation.is_none() {
            let mut compilation = self.make_compilation();
            for file in self.source_files() {
                compilation.analyze_sync(file)?;
            }
            self.logger.debug(&format!("analyzed {} files", self.source_files().len()));
            self.compilation = Some(compilation);
        }
        self.compilation
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("compilation missing after analysis"))
    }

    /// Diagnostics of the Angular analysis. With `fullTemplateTypeCheck`,
    /// the templates are checked by `oracle` as well.
    pub fn ng_semantic_diagnostics(&mut self, oracle: &dyn TypeCheckOracle) -> anyhow::Result<Vec<Diagnostic>> {
        let program = self.program;
        let full_template_type_check = self.options.full_template_type_check;
        let compilation = self.ensure_analyzed()?;
        let mut diagnostics = compilation.diagnostics().to_vec();
        if full_template_type_check {
            let known = compilation.diagnostics().len();
            let mut ctx = TypeCheckContext::new(program);
            compilation.type_check(&mut ctx)?;
            diagnostics.extend_from_slice(&compilation.diagnostics()[known..]);
            diagnostics.extend(oracle.semantic_diagnostics(&ctx.transformed_files()?));
        }
        Ok(diagnostics)
    }

    /// Every source file of the program with its Ivy definitions added.
    pub fn emit(&mut self) -> anyhow::Result<Vec<EmittedFile>> {
        let program = self.program;
        let closure = self.options.annotate_for_closure_compiler;
        let files = self.source_files();
        let compilation = self.ensure_analyzed()?;

        let mut emitted = Vec::with_capacity(files.len());
        for file in files {
            let source = program.file(file);
            let mut text = transform_ivy_source_file(compilation, source)?;
            if closure {
                text = nocollapse_hack(&text);
            }
            emitted.push(EmittedFile {
                file_name: source.file_name.clone(),
                text,
            });
        }
        Ok(emitted)
    }

    /// `dts`, the declarations emitted for the source `file_name`, with the
    /// definition fields of its classes declared. Valid after `emit`.
    pub fn transformed_dts_for(&self, file_name: &str, dts: &str) -> anyhow::Result<String> {
        match &self.compilation {
            Some(compilation) => compilation.transformed_dts_for(file_name, dts),
            None => Ok(dts.to_string()),
        }
    }
}

/// Marks the definition fields `@nocollapse` so Closure Compiler keeps them
/// on their class.
pub fn nocollapse_hack(contents: &str) -> String {
    DEFINITION_FIELD
        .replace_all(contents, "$1/** @nocollapse */ $2")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ngtsc::reflection::TypeScriptReflectionHost;
    use ts::testing::make_program;

    struct NoErrors;

    impl TypeCheckOracle for NoErrors {
        fn semantic_diagnostics(&self, _files: &[(String, String)]) -> Vec<Diagnostic> {
            Vec::new()
        }
    }

    /// Reports one diagnostic per type check block it is shown.
    struct CountingOracle;

    impl TypeCheckOracle for CountingOracle {
        fn semantic_diagnostics(&self, files: &[(String, String)]) -> Vec<Diagnostic> {
            files
                .iter()
                .flat_map(|(_, text)| text.matches("_TypeCheckBlock").map(|_| Diagnostic::error(2322, "tcb")))
                .collect()
        }
    }

    const APP: &str = r#"
import {Component, NgModule} from '@angular/core';

@Component({selector: 'app-cmp', template: '<span>{{title}}</span>'})
export class AppCmp {
  title = 'app';
}

@NgModule({declarations: [AppCmp]})
export class AppModule {}
"#;

    #[test]
    fn should_emit_definition_fields() {
        let program = make_program(&[("/app/app.ts", APP)]);
        let reflector = TypeScriptReflectionHost::new(&program);
        let mut ngtsc = NgtscProgram::new(&program, &reflector, NgCompilerOptions::default(), "/app");
        let emitted = ngtsc.emit().unwrap();
        assert_eq!(emitted.len(), 1);
        let text = &emitted[0].text;
        assert!(text.contains("static ngComponentDef = "));
        assert!(text.contains("static ngModuleDef = "));
        assert!(text.contains("static ngInjectorDef = "));
        assert!(!text.contains("@Component("));
        assert!(!text.contains("/** @nocollapse */"));
    }

    #[test]
    fn should_annotate_for_closure_compiler() {
        let program = make_program(&[("/app/app.ts", APP)]);
        let reflector = TypeScriptReflectionHost::new(&program);
        let options = NgCompilerOptions {
            annotate_for_closure_compiler: true,
            ..Default::default()
        };
        let mut ngtsc = NgtscProgram::new(&program, &reflector, options, "/app");
        let text = &ngtsc.emit().unwrap()[0].text;
        assert!(text.contains("/** @nocollapse */ static ngComponentDef = "));
    }

    #[test]
    fn should_declare_fields_in_dts() {
        let program = make_program(&[("/app/app.ts", APP)]);
        let reflector = TypeScriptReflectionHost::new(&program);
        let mut ngtsc = NgtscProgram::new(&program, &reflector, NgCompilerOptions::default(), "/app");
        ngtsc.emit().unwrap();
        let dts = ngtsc
            .transformed_dts_for("/app/app.ts", "export declare class AppCmp {\n    title: string;\n}\n")
            .unwrap();
        assert!(dts.starts_with("import * as i0 from '@angular/core';\n"));
        assert!(dts.contains("    static ngComponentDef: i0."));
    }

    #[test]
    fn should_only_type_check_when_enabled() {
        let program = make_program(&[("/app/app.ts", APP)]);
        let reflector = TypeScriptReflectionHost::new(&program);
        let mut ngtsc = NgtscProgram::new(&program, &reflector, NgCompilerOptions::default(), "/app");
        assert!(ngtsc.ng_semantic_diagnostics(&CountingOracle).unwrap().is_empty());

        let options = NgCompilerOptions {
            full_template_type_check: true,
            ..Default::default()
        };
        let mut ngtsc = NgtscProgram::new(&program, &reflector, options, "/app");
        assert!(ngtsc.ng_semantic_diagnostics(&NoErrors).unwrap().is_empty());
        assert_eq!(ngtsc.ng_semantic_diagnostics(&CountingOracle).unwrap().len(), 1);
    }

    #[test]
    fn should_report_analysis_diagnostics() {
        let program = make_program(&[(
            "/app/pipe.ts",
            "import {Pipe} from '@angular/core';\n@Pipe({pure: true})\nexport class NoName {}\n",
        )]);
        let reflector = TypeScriptReflectionHost::new(&program);
        let mut ngtsc = NgtscProgram::new(&program, &reflector, NgCompilerOptions::default(), "/app");
        let diagnostics = ngtsc.ng_semantic_diagnostics(&NoErrors).unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, -992002);
    }

    #[test]
    fn should_compute_root_dirs_from_options() {
        let program = make_program(&[("/app/app.ts", APP)]);
        let reflector = TypeScriptReflectionHost::new(&program);
        let ngtsc = NgtscProgram::new(&program, &reflector, NgCompilerOptions::default(), "/cwd");
        assert_eq!(ngtsc.root_dirs(), &["/cwd".to_string()]);
        assert!(!ngtsc.is_core());
    }

    #[derive(Default)]
    struct RecordingLogger(std::sync::Mutex<Vec<String>>);

    impl Logger for RecordingLogger {
        fn level(&self) -> crate::ngtsc::logging::LogLevel {
            crate::ngtsc::logging::LogLevel::Debug
        }

        fn write(&self, _level: crate::ngtsc::logging::LogLevel, msg: &str) {
            self.0.lock().unwrap().push(msg.to_string());
        }
    }

    #[test]
    fn should_preload_templates_through_resource_host() {
        use crate::ngtsc::resource::{ResourceError, ResourceRead};
        use std::sync::atomic::{AtomicUsize, Ordering};

        let program = make_program(&[(
            "/app/app.ts",
            "import {Component} from '@angular/core';\n\
             @Component({selector: 'app-cmp', templateUrl: './app.html'})\n\
             export class AppCmp {}\n",
        )]);
        let reflector = TypeScriptReflectionHost::new(&program);
        let fetches = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fetches);
        let host = move |url: &str| -> Result<ResourceRead, ResourceError> {
            if url != "/app/app.html" {
                return Err(ResourceError::not_found(url));
            }
            let counter = Arc::clone(&counter);
            Ok(ResourceRead::Pending(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok("<b>fetched</b>".to_string())
            })))
        };
        let logger = Arc::new(RecordingLogger::default());
        let mut ngtsc = NgtscProgram::new(&program, &reflector, NgCompilerOptions::default(), "/app")
            .with_resource_host(Arc::new(host))
            .with_logger(logger.clone());

        ngtsc.load_ng_structure_async().unwrap();
        ngtsc.load_ng_structure_async().unwrap();
        assert!(ngtsc.ng_semantic_diagnostics(&NoErrors).unwrap().is_empty());
        let text = &ngtsc.emit().unwrap()[0].text;

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert!(text.contains("fetched"));
        let messages = logger.0.lock().unwrap();
        assert!(messages.iter().any(|m| m.starts_with("analyzing AppCmp")));
    }

    #[test]
    fn should_leave_other_statics_alone() {
        let text = "class A {\n    static ngComponentDef = x;\n    static other = y;\n}\n";
        assert_eq!(
            nocollapse_hack(text),
            "class A {\n    /** @nocollapse */ static ngComponentDef = x;\n    static other = y;\n}\n"
        );
    }
}
