// Testing helpers
//
// In-memory programs and declaration fixtures shared by the test suites of
// the compiler crates.

use crate::program::Program;

/// Declarations of the `@angular/core` surface the compiler recognizes.
pub const ANGULAR_CORE_DTS: &str = r#"
export declare function Component(obj: any): any;
export declare function Directive(obj?: any): any;
export declare function Injectable(obj?: any): any;
export declare function NgModule(obj?: any): any;
export declare function Pipe(obj: any): any;
export declare function Input(alias?: string): any;
export declare function Output(alias?: string): any;
export declare function HostBinding(name?: string): any;
export declare function HostListener(event: string, args?: string[]): any;
export declare function ContentChild(selector: any, opts?: any): any;
export declare function ContentChildren(selector: any, opts?: any): any;
export declare function ViewChild(selector: any, opts?: any): any;
export declare function ViewChildren(selector: any, opts?: any): any;
export declare function Inject(token: any): any;
export declare function Optional(): any;
export declare function Self(): any;
export declare function SkipSelf(): any;
export declare function Host(): any;
export declare function Attribute(name: string): any;
export declare function forwardRef(fn: () => any): any;

export declare class InjectionToken<T> {
  constructor(desc: string, options?: any);
}
export declare class EventEmitter<T> {
  emit(value?: T): void;
}
export declare class ElementRef<T = any> {
  nativeElement: T;
}
export declare class TemplateRef<C> {}
export declare class ViewContainerRef {}
export declare class ChangeDetectorRef {}
export declare class Injector {}
export declare class Renderer2 {}
export declare class ModuleWithProviders<T> {
  ngModule: T;
  providers?: any[];
}
export declare enum ViewEncapsulation {
  Emulated = 0,
  Native = 1,
  None = 2,
  ShadowDom = 3
}
export declare enum ChangeDetectionStrategy {
  OnPush = 0,
  Default = 1
}
"#;

/// A slice of `@angular/common` as compiled `.d.ts` output, with Ivy metadata.
pub const ANGULAR_COMMON_DTS: &str = r#"
import * as i0 from '@angular/core';

export declare class NgIfContext {
  $implicit: any;
  ngIf: any;
}
export declare class NgIf {
  ngIf: any;
  ngIfThen: any;
  ngIfElse: any;
  static ngTemplateGuard_ngIf<E>(dir: NgIf, expr: E): expr is E;
  static ngTemplateContextGuard(dir: NgIf, ctx: any): ctx is NgIfContext;
  static ngDirectiveDef: i0.ɵDirectiveDefWithMeta<NgIf, "[ngIf]", never, {"ngIf": "ngIf"; "ngIfThen": "ngIfThen"; "ngIfElse": "ngIfElse"}, {}, never>;
}
export declare class NgForOfContext<T> {
  $implicit: T;
  ngForOf: T[];
  index: number;
}
export declare class NgForOf<T> {
  ngForOf: T[];
  ngForTrackBy: any;
  static ngTemplateContextGuard<T>(dir: NgForOf<T>, ctx: any): ctx is NgForOfContext<T>;
  static ngDirectiveDef: i0.ɵDirectiveDefWithMeta<NgForOf<any>, "[ngFor][ngForOf]", never, {"ngForOf": "ngForOf"; "ngForTrackBy": "ngForTrackBy"}, {}, never>;
}
export declare class AsyncPipe {
  static ngPipeDef: i0.ɵPipeDefWithMeta<AsyncPipe, "async">;
}
export declare class CommonModule {
  static ngModuleDef: i0.ɵNgModuleDefWithMeta<CommonModule, [typeof NgIf, typeof NgForOf, typeof AsyncPipe], never, [typeof NgIf, typeof NgForOf, typeof AsyncPipe]>;
}
"#;

/// Builds a program from `files` plus the `@angular/core` and
/// `@angular/common` fixtures.
///
/// Panics on syntax errors, which in tests always indicate a broken fixture.
pub fn make_program(files: &[(&str, &str)]) -> Program {
    let mut all: Vec<(&str, &str)> = files.to_vec();
    all.push(("/node_modules/@angular/core/index.d.ts", ANGULAR_CORE_DTS));
    all.push(("/node_modules/@angular/common/index.d.ts", ANGULAR_COMMON_DTS));
    match Program::new(all) {
        Ok(program) => program,
        Err(err) => panic!("failed to parse test program: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_fixtures() {
        let program = make_program(&[("/app/main.ts", "import {NgIf} from '@angular/common';")]);
        let main = program.file_by_name("/app/main.ts").unwrap().id;
        let resolved = program.resolve_identifier(main, "NgIf").unwrap();
        assert_eq!(resolved.via_module.as_deref(), Some("@angular/common"));
        assert!(program
            .find_class("/node_modules/@angular/common/index.d.ts", "CommonModule")
            .is_some());
    }
}
