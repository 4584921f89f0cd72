error_chain! {
    links {
    }

    errors {
        // stack errors
        StackUnderflow {
            display("stack underflow")
        }

        // arithmetic errors
        DivisionByZero {
            display("division by zero")
        }
        FactorialDomain(got: String) {
            display("factorial: expected a non-negative integer, got {}", got)
        }

        // type errors
        ExpectedNumber(got: &'static str) {
            display("type error: expected a number, got {}", got)
        }
        ExpectedBoolean(got: &'static str) {
            display("type error: expected a boolean, got {}", got)
        }
        ExpectedString(got: &'static str) {
            display("type error: expected a string, got {}", got)
        }
        ExpectedBlock(got: &'static str) {
            display("type error: expected a code block, got {}", got)
        }
        AddTypeMismatch(a: &'static str, b: &'static str) {
            display("type error: '+' requires two numbers or two strings, got {} and {}", a, b)
        }
        AddTypeMismatchSingle(a: &'static str) {
            display("type error: '+' requires two numbers or two strings, got {}", a)
        }
        WhileConditionType(got: &'static str) {
            display("while: condition must evaluate to a boolean or number, got {}", got)
        }

        // control flow errors
        InvalidIfArity {
            display("invalid arguments for if")
        }
        IndexOutsideLoop {
            display("index: not inside a loop")
        }
        Interrupted {
            display("execution interrupted by user")
        }

        // variable errors
        NameConflictsOpcode(name: String) {
            display("variable name '{}' conflicts with an existing command", name)
        }
        ReservedInternalName(name: String) {
            display("variable names starting with '_' are reserved for internal use: {}", name)
        }
        InternalNotBoolean(name: String) {
            display("internal variable {} can only be set to a boolean value", name)
        }
        InternalImmutable(name: String) {
            display("cannot modify internal variable: {}", name)
        }
        UndefinedVariable(name: String) {
            display("undefined variable: {}", name)
        }
        SpaceInName(name: String) {
            display("variable names cannot contain spaces: '{}'", name)
        }
        LocalInGlobalScope(name: String) {
            display("cannot define local variable '{}' in global scope", name)
        }

        // word errors
        InvalidDefinition {
            display("invalid function definition")
        }
        WordNameReserved(name: String) {
            display("word names starting with '_' are reserved for internal use: {}", name)
        }
        WordNameConflictsOpcode(name: String) {
            display("word name '{}' conflicts with an existing command", name)
        }
        UndefinedWord(name: String) {
            display("undefined word: {}", name)
        }
        NonStringBlock(name: String) {
            display("variable '{}' contains non-string elements in block", name)
        }
        CoreDefined(name: String) {
            display("'{}' is low level defined into the core", name)
        }
        SemicolonOutOfContext {
            display("semicolon out of context")
        }

        // delete / see / edit errors
        DeleteMissingName {
            display("delete: missing variable or word name")
        }
        DeleteInternal(name: String) {
            display("cannot delete internal variable or word: {}", name)
        }
        UndefinedNameAny(name: String) {
            display("undefined variable or word: {}", name)
        }
        UndefinedName(kind: &'static str, name: String) {
            display("undefined {}: {}", kind, name)
        }
        SeeMissingName {
            display("see: missing variable or word name")
        }
        EditMissingName {
            display("edit: missing name")
        }
        EditUndefined(name: String) {
            display("edit: undefined word or variable: {}", name)
        }
        EditWordNotFound(name: String) {
            display("edit: word '{}' not found", name)
        }
        EditNotABlock(name: String) {
            display("edit: variable '{}' is not a code block", name)
        }
        EditVariableNotFound(name: String) {
            display("edit: variable '{}' not found", name)
        }
        EditfileMissingName {
            display("editfile: missing filename")
        }
        EditfileNotFound(path: String) {
            display("editfile: file not found: {}", path)
        }

        // tokenizer and parser errors
        UnrecognizedToken(token: String) {
            display("unrecognized token: {}", token)
        }
        UnmatchedParen {
            display("unmatched ')'")
        }
        UnmatchedQuote {
            display("unmatched quote")
        }
        UnmatchedOpenParen {
            display("unmatched '('")
        }
        ExpectedOpenBrace {
            display("expected '{{' to start block")
        }
        UnmatchedBrace {
            display("unmatched '{{'")
        }

        // string errors
        InvalidCharInput(detail: String) {
            display("invalid character input: {}", detail)
        }
        StringBoundsOutOfRange {
            display("string bounds out of range")
        }

        // filesystem and snapshot errors
        HomeDirectory(detail: String) {
            display("failed to get home directory: {}", detail)
        }
        DataDirectory(detail: String) {
            display("failed to create data directory: {}", detail)
        }
        MarshalState(detail: String) {
            display("failed to marshal interpreter state: {}", detail)
        }
        WriteState(path: String, detail: String) {
            display("failed to write state to file {}: {}", path, detail)
        }
        ReadState(path: String, detail: String) {
            display("failed to read state from file {}: {}", path, detail)
        }
        UnmarshalState(detail: String) {
            display("failed to unmarshal interpreter state: {}", detail)
        }
        ReadWordFile(path: String, detail: String) {
            display("failed to read word file {}: {}", path, detail)
        }
        OpenExportFile(path: String, detail: String) {
            display("failed to open file {} for export: {}", path, detail)
        }
        ReadDataDir(path: String, detail: String) {
            display("failed to read data directory {}: {}", path, detail)
        }
    }
}

impl ErrorKind {
    /// Numeric code of the error, stored into `_last_error` when a command
    /// fails. The numbering is stable; holes are retired codes.
    pub fn code(&self) -> u16 {
        use self::ErrorKind::*;
        match self {
            StackUnderflow => 1,
            DivisionByZero => 2,
            ExpectedNumber(_) => 3,
            ExpectedBoolean(_) => 4,
            ExpectedString(_) => 5,
            ExpectedBlock(_) => 6,
            AddTypeMismatch(_, _) => 7,
            AddTypeMismatchSingle(_) => 8,
            InvalidIfArity => 9,
            IndexOutsideLoop => 10,
            NameConflictsOpcode(_) => 11,
            ReservedInternalName(_) => 12,
            InternalNotBoolean(_) => 13,
            InternalImmutable(_) => 14,
            UndefinedVariable(_) => 15,
            InvalidDefinition => 16,
            WordNameReserved(_) => 17,
            WordNameConflictsOpcode(_) => 18,
            DeleteMissingName => 19,
            DeleteInternal(_) => 20,
            UndefinedNameAny(_) => 21,
            UndefinedName(_, _) => 22,
            SeeMissingName => 23,
            EditMissingName => 24,
            EditUndefined(_) => 25,
            EditWordNotFound(_) => 26,
            EditNotABlock(_) => 27,
            EditVariableNotFound(_) => 28,
            UndefinedWord(_) => 30,
            NonStringBlock(_) => 32,
            UnrecognizedToken(_) => 34,
            UnmatchedParen => 35,
            UnmatchedQuote => 36,
            UnmatchedOpenParen => 37,
            ExpectedOpenBrace => 38,
            UnmatchedBrace => 39,
            HomeDirectory(_) => 40,
            DataDirectory(_) => 41,
            MarshalState(_) => 42,
            WriteState(_, _) => 43,
            ReadState(_, _) => 44,
            UnmarshalState(_) => 45,
            ReadWordFile(_, _) => 46,
            OpenExportFile(_, _) => 47,
            ReadDataDir(_, _) => 48,
            WhileConditionType(_) => 49,
            CoreDefined(_) => 50,
            Interrupted => 51,
            FactorialDomain(_) => 52,
            EditfileMissingName => 53,
            EditfileNotFound(_) => 54,
            SpaceInName(_) => 55,
            LocalInGlobalScope(_) => 56,
            SemicolonOutOfContext => 57,
            InvalidCharInput(_) => 58,
            StringBoundsOutOfRange => 59,
            _ => 0,
        }
    }
}

impl Error {
    pub fn code(&self) -> u16 {
        self.kind().code()
    }
}

/// Non-error early exits produced by `break` and `continue`, kept apart
/// from the error sum so loop bodies can intercept them while everything
/// else unwinds through word calls untouched.
#[derive(Debug)]
pub enum Signal {
    Break,
    Continue,
    Fault(Error),
}

/// Result type of the evaluator and of every opcode.
pub type Outcome<T = ()> = ::std::result::Result<T, Signal>;

impl From<Error> for Signal {
    fn from(e: Error) -> Self {
        Signal::Fault(e)
    }
}

impl From<ErrorKind> for Signal {
    fn from(kind: ErrorKind) -> Self {
        Signal::Fault(kind.into())
    }
}
