// Transform API - Core types and traits for Angular decorator handling
//
// This module provides the interface between the render3 definition
// compilers of `angular_compiler` and the ngtsc compilation pipeline.

use angular_compiler::output::output_ast as o;
use angular_compiler::ConstantPool;
use ts::{ClassDeclaration, Diagnostic};

use crate::ngtsc::annotations::base_def::BaseDefAnalysis;
use crate::ngtsc::annotations::component::ComponentAnalysis;
use crate::ngtsc::annotations::directive::DirectiveAnalysis;
use crate::ngtsc::annotations::injectable::InjectableAnalysis;
use crate::ngtsc::annotations::ng_module::NgModuleAnalysis;
use crate::ngtsc::annotations::pipe::PipeAnalysis;
use crate::ngtsc::diagnostics::HandlerResult;
use crate::ngtsc::reflection::Decorator;
use crate::ngtsc::resource::PreloadTask;
use crate::ngtsc::scope::SelectorScopeRegistry;
use crate::ngtsc::typecheck::TypeCheckContext;

// ============================================================================
// Core Enums
// ============================================================================

/// The kinds of Angular annotation a handler compiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    BaseDef,
    Component,
    Directive,
    Injectable,
    NgModule,
    Pipe,
}

/// Analysis of a class by the handler of its annotation kind.
#[derive(Debug)]
pub enum Analysis {
    BaseDef(BaseDefAnalysis),
    Component(Box<ComponentAnalysis>),
    Directive(Box<DirectiveAnalysis>),
    Injectable(InjectableAnalysis),
    NgModule(Box<NgModuleAnalysis>),
    Pipe(PipeAnalysis),
}

impl Analysis {
    pub fn kind(&self) -> AnnotationKind {
        match self {
            Analysis::BaseDef(_) => AnnotationKind::BaseDef,
            Analysis::Component(_) => AnnotationKind::Component,
            Analysis::Directive(_) => AnnotationKind::Directive,
            Analysis::Injectable(_) => AnnotationKind::Injectable,
            Analysis::NgModule(_) => AnnotationKind::NgModule,
            Analysis::Pipe(_) => AnnotationKind::Pipe,
        }
    }
}

// ============================================================================
// Core Structs
// ============================================================================

/// The output of detecting a trait for a declaration as the result of the first phase
/// of the compilation pipeline.
#[derive(Debug, Clone)]
pub struct DetectResult {
    /// The decorator that triggered the match. The base-def handler matches
    /// on decorated members and has none.
    pub trigger: Option<Decorator>,
}

/// The output of an analysis operation, consisting of possibly an analysis
/// and potentially diagnostics if there were errors uncovered during analysis.
#[derive(Debug, Default)]
pub struct AnalysisOutput {
    pub analysis: Option<Analysis>,
    pub diagnostics: Option<Vec<Diagnostic>>,
    /// Whether the class takes part in template type-checking.
    pub type_check: bool,
}

impl AnalysisOutput {
    pub fn of(analysis: Analysis) -> Self {
        Self {
            analysis: Some(analysis),
            ..Default::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_type_check(mut self) -> Self {
        self.type_check = true;
        self
    }
}

/// A description of the static field to add to a class, including an initialization expression
/// and a type for the .d.ts file.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileResult {
    /// The name of the static field to add.
    pub name: String,

    pub initializer: o::Expression,

    /// Statements to add after the class.
    pub statements: Vec<o::Statement>,

    /// The type of the field in the .d.ts file.
    pub type_: o::Type,
}

// ============================================================================
// DecoratorHandler Trait
// ============================================================================

/// Provides the interface between a decorator compiler from `angular_compiler`
/// and the compilation pipeline.
///
/// The decorator compilers do not depend on TypeScript. The handler is responsible for
/// extracting the information required to perform compilation from the decorators and
/// source, invoking the decorator compiler, and returning the result.
pub trait DecoratorHandler<'a> {
    fn kind(&self) -> AnnotationKind;

    /// Scan the reflected decorators of a class and determine if this handler
    /// is responsible for compiling it.
    fn detect(&self, node: &ClassDeclaration, decorators: Option<&[Decorator]>) -> Option<DetectResult>;

    /// Start loading whatever `analyze` will need, so it can be fetched
    /// concurrently for the whole program.
    fn preanalyze(&self, _node: &ClassDeclaration, _detected: &DetectResult) -> HandlerResult<Vec<PreloadTask>> {
        Ok(Vec::new())
    }

    /// Perform analysis on the decorator/class combination, extracting information
    /// from the class required for compilation, and register the class with
    /// the scope registry.
    fn analyze(
        &self,
        node: &ClassDeclaration,
        detected: &DetectResult,
        scopes: &mut SelectorScopeRegistry<'a>,
    ) -> HandlerResult<AnalysisOutput>;

    /// Add the templates of the class to the type-checking context.
    fn type_check(
        &self,
        _ctx: &mut TypeCheckContext<'a>,
        _node: &ClassDeclaration,
        _analysis: &Analysis,
        _scopes: &mut SelectorScopeRegistry<'a>,
    ) -> HandlerResult<()> {
        Ok(())
    }

    /// Generate the static fields of the class. Runs after every class of
    /// the program has been analyzed.
    fn compile(
        &self,
        node: &ClassDeclaration,
        analysis: &Analysis,
        scopes: &mut SelectorScopeRegistry<'a>,
        constant_pool: &mut ConstantPool,
    ) -> HandlerResult<Vec<CompileResult>>;
}
