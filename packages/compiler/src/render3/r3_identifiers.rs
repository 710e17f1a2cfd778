//! Render3 Identifiers
//!
//! Runtime symbols of `@angular/core` referenced by generated code.

use crate::output::output_ast::ExternalReference;

pub const CORE: &str = "@angular/core";

/// Angular runtime identifiers used in generated code
pub struct Identifiers;

impl Identifiers {
    /* Methods */
    pub const NEW_METHOD: &'static str = "factory";
    pub const TRANSFORM_METHOD: &'static str = "transform";

    fn make_ref(name: &str) -> ExternalReference {
        ExternalReference::new(CORE, name)
    }

    /* Instructions */
    pub fn element_start() -> ExternalReference {
        Self::make_ref("ɵelementStart")
    }

    pub fn element_end() -> ExternalReference {
        Self::make_ref("ɵelementEnd")
    }

    pub fn element_property() -> ExternalReference {
        Self::make_ref("ɵelementProperty")
    }

    pub fn element_attribute() -> ExternalReference {
        Self::make_ref("ɵelementAttribute")
    }

    pub fn element_class_prop() -> ExternalReference {
        Self::make_ref("ɵelementClassProp")
    }

    pub fn element_style_prop() -> ExternalReference {
        Self::make_ref("ɵelementStyleProp")
    }

    pub fn bind() -> ExternalReference {
        Self::make_ref("ɵbind")
    }

    pub fn text() -> ExternalReference {
        Self::make_ref("ɵtext")
    }

    pub fn text_binding() -> ExternalReference {
        Self::make_ref("ɵtextBinding")
    }

    pub fn interpolation_v() -> ExternalReference {
        Self::make_ref("ɵinterpolationV")
    }

    pub fn interpolation(count: usize) -> ExternalReference {
        Self::make_ref(&format!("ɵinterpolation{}", count))
    }

    pub fn template_create() -> ExternalReference {
        Self::make_ref("ɵtemplate")
    }

    pub fn listener() -> ExternalReference {
        Self::make_ref("ɵlistener")
    }

    pub fn next_context() -> ExternalReference {
        Self::make_ref("ɵnextContext")
    }

    pub fn reference() -> ExternalReference {
        Self::make_ref("ɵreference")
    }

    pub fn projection_def() -> ExternalReference {
        Self::make_ref("ɵprojectionDef")
    }

    pub fn projection() -> ExternalReference {
        Self::make_ref("ɵprojection")
    }

    pub fn pipe() -> ExternalReference {
        Self::make_ref("ɵpipe")
    }

    pub fn pipe_bind(arg_count: usize) -> ExternalReference {
        match arg_count {
            1..=4 => Self::make_ref(&format!("ɵpipeBind{}", arg_count)),
            _ => Self::make_ref("ɵpipeBindV"),
        }
    }

    pub fn content_query() -> ExternalReference {
        Self::make_ref("ɵcontentQuery")
    }

    pub fn view_query() -> ExternalReference {
        Self::make_ref("ɵviewQuery")
    }

    pub fn load_content_query() -> ExternalReference {
        Self::make_ref("ɵloadContentQuery")
    }

    pub fn load_view_query() -> ExternalReference {
        Self::make_ref("ɵloadViewQuery")
    }

    pub fn query_refresh() -> ExternalReference {
        Self::make_ref("ɵqueryRefresh")
    }

    /* Dependency injection */
    pub fn inject() -> ExternalReference {
        Self::make_ref("inject")
    }

    pub fn directive_inject() -> ExternalReference {
        Self::make_ref("ɵdirectiveInject")
    }

    pub fn inject_attribute() -> ExternalReference {
        Self::make_ref("ɵinjectAttribute")
    }

    pub fn get_inherited_factory() -> ExternalReference {
        Self::make_ref("ɵgetInheritedFactory")
    }

    /* Definitions */
    pub fn define_base() -> ExternalReference {
        Self::make_ref("ɵdefineBase")
    }

    pub fn define_component() -> ExternalReference {
        Self::make_ref("ɵdefineComponent")
    }

    pub fn define_directive() -> ExternalReference {
        Self::make_ref("ɵdefineDirective")
    }

    pub fn define_pipe() -> ExternalReference {
        Self::make_ref("ɵdefinePipe")
    }

    pub fn define_ng_module() -> ExternalReference {
        Self::make_ref("ɵdefineNgModule")
    }

    pub fn define_injector() -> ExternalReference {
        Self::make_ref("defineInjector")
    }

    pub fn define_injectable() -> ExternalReference {
        Self::make_ref("defineInjectable")
    }

    pub fn set_class_metadata() -> ExternalReference {
        Self::make_ref("ɵsetClassMetadata")
    }

    /* Definition types */
    pub fn base_def() -> ExternalReference {
        Self::make_ref("ɵBaseDef")
    }

    pub fn component_def_with_meta() -> ExternalReference {
        Self::make_ref("ɵComponentDefWithMeta")
    }

    pub fn directive_def_with_meta() -> ExternalReference {
        Self::make_ref("ɵDirectiveDefWithMeta")
    }

    pub fn pipe_def_with_meta() -> ExternalReference {
        Self::make_ref("ɵPipeDefWithMeta")
    }

    pub fn ng_module_def_with_meta() -> ExternalReference {
        Self::make_ref("ɵNgModuleDefWithMeta")
    }

    pub fn injector_def() -> ExternalReference {
        Self::make_ref("ɵInjectorDef")
    }

    pub fn injectable_def() -> ExternalReference {
        Self::make_ref("InjectableDef")
    }

    /* Features */
    pub fn ng_on_changes_feature() -> ExternalReference {
        Self::make_ref("ɵNgOnChangesFeature")
    }

    pub fn inherit_definition_feature() -> ExternalReference {
        Self::make_ref("ɵInheritDefinitionFeature")
    }

    pub fn providers_feature() -> ExternalReference {
        Self::make_ref("ɵProvidersFeature")
    }
}
