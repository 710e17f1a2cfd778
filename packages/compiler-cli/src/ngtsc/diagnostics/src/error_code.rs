// Error Codes
//
// Stable numeric codes of the diagnostics the compiler reports. They are
// surfaced to users as `NG<code>`.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    DecoratorArgNotLiteral = 1001,
    DecoratorArityWrong = 1002,
    DecoratorNotCalled = 1003,
    DecoratorOnAnonymousClass = 1004,
    DecoratorUnexpected = 1005,

    ValueHasWrongType = 1010,
    ValueNotLiteral = 1011,

    ComponentMissingTemplate = 2001,
    PipeMissingName = 2002,
    ParamMissingToken = 2003,

    /// Raised when the exported scope of an NgModule depends on itself.
    ScopeCycle = 2004,

    /// Raised when a component template fails to parse.
    TemplateParseError = 2005,

    /// Raised when a module, directive or pipe is registered twice, or a
    /// declaration is claimed by a second NgModule.
    DuplicateRegistration = 2006,
}

impl ErrorCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}
