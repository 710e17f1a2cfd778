// Compilation Tests - Tests for IvyCompilation
//
// These tests drive the compilation with mock handlers to verify how
// classes are claimed, how handler errors are recorded and when resources
// are preloaded.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use angular_compiler::output::output_ast as o;
use angular_compiler::render3::view::R3BaseRefMetadata;
use angular_compiler::ConstantPool;
use indexmap::IndexMap;
use ts::testing::make_program;
use ts::{ClassDeclaration, Program};

use crate::ngtsc::annotations::BaseDefAnalysis;
use crate::ngtsc::diagnostics::{fatal, ErrorCode, HandlerResult};
use crate::ngtsc::logging::NullLogger;
use crate::ngtsc::reflection::{Decorator, TypeScriptReflectionHost};
use crate::ngtsc::resource::{PreloadTask, ResourceError};
use crate::ngtsc::scope::SelectorScopeRegistry;
use crate::ngtsc::transform::{
    Analysis, AnalysisOutput, AnnotationKind, CompileResult, DecoratorHandler, DetectResult, IvyCompilation,
};

// ============================================================================
// Mock Decorator Handlers
// ============================================================================

/// Claims classes decorated with `decorator` and compiles them into a
/// `field` initialized with the class name.
struct MockHandler {
    kind: AnnotationKind,
    decorator: &'static str,
    field: &'static str,
    /// Preloads run so far, shared with the test.
    preloaded: Arc<AtomicUsize>,
    /// Value of `preloaded` when each class was analyzed.
    seen_at_analysis: Arc<AtomicUsize>,
}

impl MockHandler {
    fn new(kind: AnnotationKind, decorator: &'static str, field: &'static str) -> Self {
        Self {
            kind,
            decorator,
            field,
            preloaded: Arc::default(),
            seen_at_analysis: Arc::default(),
        }
    }
}

impl<'a> DecoratorHandler<'a> for MockHandler {
    fn kind(&self) -> AnnotationKind {
        self.kind
    }

    fn detect(&self, _node: &ClassDeclaration, decorators: Option<&[Decorator]>) -> Option<DetectResult> {
        let decorator = decorators
            .unwrap_or_default()
            .iter()
            .find(|decorator| decorator.name == self.decorator)?;
        Some(DetectResult {
            trigger: Some(decorator.clone()),
        })
    }

    fn preanalyze(&self, node: &ClassDeclaration, _detected: &DetectResult) -> HandlerResult<Vec<PreloadTask>> {
        let preloaded = self.preloaded.clone();
        let url = format!("{}.html", node.name_text().unwrap_or_default());
        Ok(vec![PreloadTask::new(url, move || {
            preloaded.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })])
    }

    fn analyze(
        &self,
        node: &ClassDeclaration,
        detected: &DetectResult,
        _scopes: &mut SelectorScopeRegistry<'a>,
    ) -> HandlerResult<AnalysisOutput> {
        self.seen_at_analysis
            .store(self.preloaded.load(Ordering::SeqCst), Ordering::SeqCst);
        if node.name_text() == Some("Broken") {
            let span = detected.trigger.as_ref().map(|decorator| decorator.span.clone());
            return fatal(ErrorCode::DecoratorArgNotLiteral, span, "Broken cannot be analyzed");
        }
        if node.name_text() == Some("Internal") {
            return Err(anyhow::anyhow!("unexpected class shape").into());
        }
        Ok(AnalysisOutput::of(Analysis::BaseDef(BaseDefAnalysis {
            meta: R3BaseRefMetadata {
                inputs: IndexMap::new(),
                outputs: IndexMap::new(),
            },
        })))
    }

    fn compile(
        &self,
        node: &ClassDeclaration,
        _analysis: &Analysis,
        _scopes: &mut SelectorScopeRegistry<'a>,
        _constant_pool: &mut ConstantPool,
    ) -> HandlerResult<Vec<CompileResult>> {
        Ok(vec![CompileResult {
            name: self.field.to_string(),
            initializer: o::literal(node.name_text().unwrap_or_default()),
            statements: vec![o::variable("register").call_fn(vec![]).to_stmt()],
            type_: o::dynamic_type(),
        }])
    }
}

fn compilation<'a>(
    program: &'a Program,
    reflector: &'a TypeScriptReflectionHost<'a>,
    handlers: Vec<MockHandler>,
) -> IvyCompilation<'a> {
    let handlers = handlers
        .into_iter()
        .map(|handler| Box::new(handler) as Box<dyn DecoratorHandler<'a> + 'a>)
        .collect();
    IvyCompilation::new(handlers, program, reflector, None, Arc::new(NullLogger::new()))
}

const SOURCE: &str = r#"
function Mock(): any { return null; }
function Other(): any { return null; }

@Mock()
export class Claimed {}

export class Plain {}
"#;

#[test]
fn should_record_analysis_of_claimed_classes() {
    let program = make_program(&[("/app/a.ts", SOURCE)]);
    let reflector = TypeScriptReflectionHost::new(&program);
    let handler = MockHandler::new(AnnotationKind::Directive, "Mock", "ngMockDef");
    let mut compilation = compilation(&program, &reflector, vec![handler]);
    let file = program.file_by_name("/app/a.ts").unwrap().id;
    compilation.analyze_sync(file).unwrap();

    let claimed = program.find_class("/app/a.ts", "Claimed").unwrap();
    let plain = program.find_class("/app/a.ts", "Plain").unwrap();
    let record = compilation.record_for(claimed).unwrap();
    assert_eq!(record.analysis.kind(), AnnotationKind::BaseDef);
    assert_eq!(compilation.ivy_decorator_for(claimed).unwrap().name, "Mock");
    assert!(compilation.record_for(plain).is_none());
    assert!(compilation.diagnostics().is_empty());
}

#[test]
fn should_let_the_first_matching_handler_claim_a_class() {
    let program = make_program(&[("/app/a.ts", SOURCE)]);
    let reflector = TypeScriptReflectionHost::new(&program);
    let first = MockHandler::new(AnnotationKind::Component, "Mock", "ngFirstDef");
    let second = MockHandler::new(AnnotationKind::Directive, "Mock", "ngSecondDef");
    let mut compilation = compilation(&program, &reflector, vec![first, second]);
    compilation
        .analyze_sync(program.file_by_name("/app/a.ts").unwrap().id)
        .unwrap();

    let claimed = program.find_class("/app/a.ts", "Claimed").unwrap();
    let results = compilation
        .compile_ivy_field_for(claimed, &mut ConstantPool::new())
        .unwrap()
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "ngFirstDef");
}

#[test]
fn should_record_fatal_errors_per_class() {
    let program = make_program(&[(
        "/app/a.ts",
        "function Mock(): any { return null; }\n@Mock()\nexport class Broken {}\n@Mock()\nexport class Fine {}\n",
    )]);
    let reflector = TypeScriptReflectionHost::new(&program);
    let handler = MockHandler::new(AnnotationKind::Directive, "Mock", "ngMockDef");
    let mut compilation = compilation(&program, &reflector, vec![handler]);
    compilation
        .analyze_sync(program.file_by_name("/app/a.ts").unwrap().id)
        .unwrap();

    assert_eq!(compilation.diagnostics().len(), 1);
    assert_eq!(compilation.diagnostics()[0].code, -991001);
    assert_eq!(compilation.diagnostics()[0].file.as_deref(), Some("/app/a.ts"));
    let broken = program.find_class("/app/a.ts", "Broken").unwrap();
    let fine = program.find_class("/app/a.ts", "Fine").unwrap();
    assert!(compilation.record_for(broken).is_none());
    assert!(compilation.record_for(fine).is_some());
}

#[test]
fn should_propagate_internal_errors() {
    let program = make_program(&[(
        "/app/a.ts",
        "function Mock(): any { return null; }\n@Mock()\nexport class Internal {}\n",
    )]);
    let reflector = TypeScriptReflectionHost::new(&program);
    let handler = MockHandler::new(AnnotationKind::Directive, "Mock", "ngMockDef");
    let mut compilation = compilation(&program, &reflector, vec![handler]);
    let err = compilation
        .analyze_sync(program.file_by_name("/app/a.ts").unwrap().id)
        .unwrap_err();
    assert!(err.to_string().contains("unexpected class shape"));
    assert!(compilation.diagnostics().is_empty());
}

#[test]
fn should_preload_before_analyzing() {
    let program = make_program(&[
        ("/app/a.ts", SOURCE),
        (
            "/app/b.ts",
            "function Mock(): any { return null; }\n@Mock()\nexport class Second {}\n",
        ),
    ]);
    let reflector = TypeScriptReflectionHost::new(&program);
    let handler = MockHandler::new(AnnotationKind::Directive, "Mock", "ngMockDef");
    let preloaded = handler.preloaded.clone();
    let seen_at_analysis = handler.seen_at_analysis.clone();
    let mut compilation = compilation(&program, &reflector, vec![handler]);
    let files = [
        program.file_by_name("/app/a.ts").unwrap().id,
        program.file_by_name("/app/b.ts").unwrap().id,
    ];
    compilation.analyze_async(&files).unwrap();

    assert_eq!(preloaded.load(Ordering::SeqCst), 2);
    // Every preload has joined before the first class is analyzed.
    assert_eq!(seen_at_analysis.load(Ordering::SeqCst), 2);
    assert!(compilation
        .record_for(program.find_class("/app/b.ts", "Second").unwrap())
        .is_some());
}

#[test]
fn should_report_failed_preloads_through_analysis() {
    struct FailingPreload(MockHandler);

    impl<'a> DecoratorHandler<'a> for FailingPreload {
        fn kind(&self) -> AnnotationKind {
            self.0.kind
        }

        fn detect(&self, node: &ClassDeclaration, decorators: Option<&[Decorator]>) -> Option<DetectResult> {
            self.0.detect(node, decorators)
        }

        fn preanalyze(&self, _node: &ClassDeclaration, _detected: &DetectResult) -> HandlerResult<Vec<PreloadTask>> {
            Ok(vec![PreloadTask::new("missing.html", || {
                Err(ResourceError::not_found("missing.html"))
            })])
        }

        fn analyze(
            &self,
            node: &ClassDeclaration,
            detected: &DetectResult,
            scopes: &mut SelectorScopeRegistry<'a>,
        ) -> HandlerResult<AnalysisOutput> {
            self.0.analyze(node, detected, scopes)
        }

        fn compile(
            &self,
            node: &ClassDeclaration,
            analysis: &Analysis,
            scopes: &mut SelectorScopeRegistry<'a>,
            constant_pool: &mut ConstantPool,
        ) -> HandlerResult<Vec<CompileResult>> {
            self.0.compile(node, analysis, scopes, constant_pool)
        }
    }

    let program = make_program(&[("/app/a.ts", SOURCE)]);
    let reflector = TypeScriptReflectionHost::new(&program);
    let handler = FailingPreload(MockHandler::new(AnnotationKind::Component, "Mock", "ngMockDef"));
    let handlers: Vec<Box<dyn DecoratorHandler<'_> + '_>> = vec![Box::new(handler)];
    let mut compilation = IvyCompilation::new(handlers, &program, &reflector, None, Arc::new(NullLogger::new()));
    compilation
        .analyze_async(&[program.file_by_name("/app/a.ts").unwrap().id])
        .unwrap();
    assert!(compilation.diagnostics().is_empty());
    assert!(compilation
        .record_for(program.find_class("/app/a.ts", "Claimed").unwrap())
        .is_some());
}

#[test]
fn should_analyze_classes_declared_in_function_bodies() {
    let program = make_program(&[(
        "/app/a.ts",
        "function Mock(): any { return null; }\nexport function factory() {\n  @Mock()\n  class Nested {}\n  return Nested;\n}\n",
    )]);
    let reflector = TypeScriptReflectionHost::new(&program);
    let handler = MockHandler::new(AnnotationKind::Directive, "Mock", "ngMockDef");
    let mut compilation = compilation(&program, &reflector, vec![handler]);
    let file = program.file_by_name("/app/a.ts").unwrap();
    compilation.analyze_sync(file.id).unwrap();
    let nested = file.all_classes()[0];
    assert_eq!(nested.name_text(), Some("Nested"));
    assert!(compilation.record_for(nested).is_some());
}

#[test]
fn should_skip_declaration_files() {
    let program = make_program(&[(
        "/app/lib.d.ts",
        "declare function Mock(): any;\n@Mock()\nexport class Declared {}\n",
    )]);
    let reflector = TypeScriptReflectionHost::new(&program);
    let handler = MockHandler::new(AnnotationKind::Directive, "Mock", "ngMockDef");
    let mut compilation = compilation(&program, &reflector, vec![handler]);
    compilation
        .analyze_sync(program.file_by_name("/app/lib.d.ts").unwrap().id)
        .unwrap();
    let declared = program.find_class("/app/lib.d.ts", "Declared").unwrap();
    assert!(compilation.record_for(declared).is_none());
}

#[test]
fn should_record_compiled_fields_for_declarations() {
    let program = make_program(&[("/app/a.ts", SOURCE)]);
    let reflector = TypeScriptReflectionHost::new(&program);
    let handler = MockHandler::new(AnnotationKind::Directive, "Mock", "ngMockDef");
    let mut compilation = compilation(&program, &reflector, vec![handler]);
    compilation
        .analyze_sync(program.file_by_name("/app/a.ts").unwrap().id)
        .unwrap();
    let claimed = program.find_class("/app/a.ts", "Claimed").unwrap();
    let plain = program.find_class("/app/a.ts", "Plain").unwrap();
    assert!(compilation
        .compile_ivy_field_for(plain, &mut ConstantPool::new())
        .unwrap()
        .is_none());
    compilation
        .compile_ivy_field_for(claimed, &mut ConstantPool::new())
        .unwrap();

    let dts = compilation
        .transformed_dts_for("/app/a.ts", "export declare class Claimed {\n}\nexport declare class Plain {\n}\n")
        .unwrap();
    assert_eq!(
        dts,
        "export declare class Claimed {\n    static ngMockDef: any;\n}\nexport declare class Plain {\n}\n"
    );
    assert_eq!(
        compilation.transformed_dts_for("/app/other.ts", "export {};\n").unwrap(),
        "export {};\n"
    );
}
