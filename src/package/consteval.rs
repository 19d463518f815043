//! Constant evaluation
//!
//! Evaluates Go constant declarations to exact values: untyped integers
//! (held in 128 bits), strings, runes and booleans, with `iota`, implicit
//! repetition inside grouped declarations, conversions and the constant
//! builtins. Anything else evaluates to [`ConstValue::Unknown`], which
//! prints as `unknown` the way Go's `constant.Unknown` does.

use std::collections::{HashMap, HashSet};
use std::fmt;

use log::warn;

use crate::diagnostics::error_codes::constants;
use crate::parser::ast::*;

/// An exact constant value.
///
/// Integers are held in 128 bits. Go keeps untyped constants at arbitrary
/// precision, so an intermediate result outside that range, such as
/// `1 << 200 >> 190`, evaluates to [`ConstValue::Unknown`] here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstValue {
    Int(i128),
    Str(String),
    Bool(bool),
    Unknown,
}

impl ConstValue {
    /// Exact literal text, matching Go's `constant.Value.ExactString`
    pub fn exact_string(&self) -> String {
        match self {
            ConstValue::Int(value) => value.to_string(),
            ConstValue::Str(value) => quote(value),
            ConstValue::Bool(value) => value.to_string(),
            ConstValue::Unknown => "unknown".to_string(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ConstValue::Unknown)
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.exact_string())
    }
}

/// Quote a string with Go's `strconv.Quote` escaping
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{7}' => out.push_str("\\a"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{b}' => out.push_str("\\v"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c if c.is_control() => {
                if (c as u32) < 0x10000 {
                    out.push_str(&format!("\\u{:04x}", c as u32));
                } else {
                    out.push_str(&format!("\\U{:08x}", c as u32));
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Value of an integer literal such as `404`, `0x1F`, `0o17`, `0755`, `1_000`
pub fn parse_int_lit(text: &str) -> Option<i128> {
    let digits: String = text.chars().filter(|&c| c != '_').collect();
    let lower = digits.to_ascii_lowercase();

    let (radix, body) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, &lower[1..])
    } else {
        (10, lower.as_str())
    };

    i128::from_str_radix(body, radix).ok()
}

/// Value of a rune literal such as `'a'` or `'\n'`
pub fn parse_char_lit(text: &str) -> Option<i128> {
    let body = text.strip_prefix('\'')?.strip_suffix('\'')?;
    let bytes = unescape(body, '\'')?;
    let decoded = String::from_utf8(bytes.clone()).ok();
    match decoded.as_deref().map(|s| {
        let mut chars = s.chars();
        (chars.next(), chars.next())
    }) {
        Some((Some(c), None)) => Some(c as i128),
        // A single byte escape such as '\xff'
        _ if bytes.len() == 1 => Some(bytes[0] as i128),
        _ => None,
    }
}

/// Value of a string literal, interpreted or raw
pub fn parse_string_lit(text: &str) -> Option<String> {
    if let Some(raw) = text.strip_prefix('`').and_then(|t| t.strip_suffix('`')) {
        return Some(raw.replace('\r', ""));
    }
    let body = text.strip_prefix('"')?.strip_suffix('"')?;
    String::from_utf8(unescape(body, '"')?).ok()
}

fn unescape(body: &str, quote: char) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }

        let escape = chars.next()?;
        let simple = match escape {
            'a' => Some(0x07),
            'b' => Some(0x08),
            'f' => Some(0x0c),
            'n' => Some(b'\n'),
            'r' => Some(b'\r'),
            't' => Some(b'\t'),
            'v' => Some(0x0b),
            '\\' => Some(b'\\'),
            c if c == quote => Some(c as u8),
            _ => None,
        };
        if let Some(byte) = simple {
            out.push(byte);
            continue;
        }

        match escape {
            'x' => {
                let hex: String = (0..2).filter_map(|_| chars.next()).collect();
                out.push(u8::from_str_radix(&hex, 16).ok()?);
            }
            '0'..='7' => {
                let mut octal = escape.to_string();
                octal.extend((0..2).filter_map(|_| chars.next()));
                let value = u32::from_str_radix(&octal, 8).ok()?;
                out.push(u8::try_from(value).ok()?);
            }
            'u' | 'U' => {
                let len = if escape == 'u' { 4 } else { 8 };
                let hex: String = (0..len).filter_map(|_| chars.next()).collect();
                let c = char::from_u32(u32::from_str_radix(&hex, 16).ok()?)?;
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
            _ => return None,
        }
    }

    Some(out)
}

/// Width of a typed integer constant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IntType {
    Sized { bits: u32, signed: bool },
    /// A type declared in another package
    Opaque,
}

impl IntType {
    const fn sized(bits: u32, signed: bool) -> Self {
        IntType::Sized { bits, signed }
    }

    fn predeclared(name: &str) -> Option<Self> {
        let ty = match name {
            "int" | "int64" => Self::sized(64, true),
            "int8" => Self::sized(8, true),
            "int16" => Self::sized(16, true),
            "int32" | "rune" => Self::sized(32, true),
            "uint" | "uint64" | "uintptr" => Self::sized(64, false),
            "uint8" | "byte" => Self::sized(8, false),
            "uint16" => Self::sized(16, false),
            "uint32" => Self::sized(32, false),
            _ => return None,
        };
        Some(ty)
    }

    fn contains(self, value: i128) -> bool {
        match self {
            IntType::Sized { bits, signed: true } => {
                let half = 1i128 << (bits - 1);
                (-half..half).contains(&value)
            }
            IntType::Sized { bits, signed: false } => (0..1i128 << bits).contains(&value),
            IntType::Opaque => true,
        }
    }
}

/// What a type expression resolves to, as far as constants care
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeClass {
    Int(IntType),
    String,
    /// Floats, complex numbers, booleans
    Other,
}

/// A constant value with the integer type it carries, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Typed {
    pub value: ConstValue,
    pub ty: Option<IntType>,
}

impl Typed {
    fn untyped(value: ConstValue) -> Self {
        Self { value, ty: None }
    }

    fn unknown() -> Self {
        Self::untyped(ConstValue::Unknown)
    }

    /// Attach `ty`, or become unknown when the value does not fit
    fn with_type(value: ConstValue, ty: Option<IntType>) -> Self {
        match (&value, ty) {
            (ConstValue::Int(v), Some(ty)) if !ty.contains(*v) => Self::unknown(),
            (ConstValue::Int(_), ty) => Self { value, ty },
            _ => Self::untyped(value),
        }
    }
}

/// Function-local constants visible at a point of a body
pub(crate) type Locals = HashMap<String, Typed>;

/// Where a constant's value comes from
#[derive(Debug, Clone, Copy)]
pub(crate) struct ConstDef<'a> {
    /// The expression after implicit repetition, if any
    pub expr: Option<&'a Expr>,
    /// The declared type, repeated along with the expression
    pub ty: Option<&'a Expr>,
    pub iota: i128,
}

/// Expand a constant declaration into (name, definition) pairs, applying
/// implicit repetition of the previous specification's type and expressions.
pub(crate) fn const_defs(decl: &GenDecl) -> Vec<(&Ident, ConstDef<'_>)> {
    let mut defs = Vec::new();
    let mut previous: &[Expr] = &[];
    let mut previous_ty = None;

    for (index, spec) in decl.specs.iter().enumerate() {
        let Spec::Value(spec) = spec else {
            continue;
        };
        if !spec.values.is_empty() {
            previous = &spec.values;
            previous_ty = spec.ty.as_ref();
        }
        for (position, name) in spec.names.iter().enumerate() {
            defs.push((
                name,
                ConstDef {
                    expr: previous.get(position),
                    ty: previous_ty,
                    iota: index as i128,
                },
            ));
        }
    }

    defs
}

/// Evaluates constants of one package.
///
/// Package-level constants are evaluated lazily and memoized, so they may
/// refer to each other in any order and across files.
pub(crate) struct Evaluator<'a> {
    defs: HashMap<String, ConstDef<'a>>,
    types: HashMap<String, &'a Expr>,
    cache: HashMap<String, Typed>,
    in_progress: HashSet<String>,
}

impl<'a> Evaluator<'a> {
    pub fn new(files: impl IntoIterator<Item = &'a File>) -> Self {
        let mut defs = HashMap::new();
        let mut types = HashMap::new();

        for file in files {
            for decl in &file.decls {
                let Decl::Gen(decl) = decl else {
                    continue;
                };
                match decl.keyword {
                    DeclKeyword::Const => {
                        for (name, def) in const_defs(decl) {
                            if name.name != "_" {
                                defs.insert(name.name.clone(), def);
                            }
                        }
                    }
                    DeclKeyword::Type => {
                        for spec in &decl.specs {
                            if let Spec::Type(spec) = spec {
                                types.insert(spec.name.name.clone(), &spec.ty);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        Self {
            defs,
            types,
            cache: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    /// Value of a package-level constant
    pub fn package_const(&mut self, name: &str) -> Option<ConstValue> {
        self.package_typed(name).map(|typed| typed.value)
    }

    fn package_typed(&mut self, name: &str) -> Option<Typed> {
        if let Some(typed) = self.cache.get(name) {
            return Some(typed.clone());
        }
        let def = *self.defs.get(name)?;

        if !self.in_progress.insert(name.to_string()) {
            warn!(code = constants::CONSTANT_CYCLE, name = name; "constant definition cycle");
            return Some(Typed::unknown());
        }

        let typed = self.eval_def(def, &Locals::new());

        self.in_progress.remove(name);
        self.cache.insert(name.to_string(), typed.clone());
        Some(typed)
    }

    /// Evaluate the constants of a function-local declaration in order,
    /// adding them to `locals`.
    pub fn local_decl(
        &mut self,
        decl: &'a GenDecl,
        locals: &mut Locals,
    ) -> Vec<(&'a Ident, ConstValue)> {
        let mut values = Vec::new();
        for (name, def) in const_defs(decl) {
            let typed = self.eval_def(def, locals);
            values.push((name, typed.value.clone()));
            if name.name != "_" {
                locals.insert(name.name.clone(), typed);
            }
        }
        values
    }

    fn eval_def(&mut self, def: ConstDef<'_>, locals: &Locals) -> Typed {
        let Some(expr) = def.expr else {
            return Typed::unknown();
        };
        let typed = self.eval_typed(expr, Some(def.iota), locals);
        match def.ty {
            Some(ty) => self.convert(ty, typed),
            None => typed,
        }
    }

    /// Evaluate a constant expression
    fn eval_typed(&mut self, expr: &Expr, iota: Option<i128>, locals: &Locals) -> Typed {
        match &expr.kind {
            ExprKind::Ident(name) => self.lookup(name, iota, locals),
            ExprKind::BasicLit(lit) => Typed::untyped(eval_literal(lit)),
            ExprKind::Paren(inner) => self.eval_typed(inner, iota, locals),
            ExprKind::Unary { op, expr: inner } => {
                let operand = self.eval_typed(inner, iota, locals);
                eval_unary(*op, operand)
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.eval_typed(lhs, iota, locals);
                let rhs = self.eval_typed(rhs, iota, locals);
                eval_binary(*op, lhs, rhs)
            }
            ExprKind::Call { func, args, .. } => self.eval_call(func, args, iota, locals),
            _ => Typed::unknown(),
        }
    }

    fn lookup(&mut self, name: &str, iota: Option<i128>, locals: &Locals) -> Typed {
        if let Some(typed) = locals.get(name) {
            return typed.clone();
        }
        if let Some(typed) = self.package_typed(name) {
            return typed;
        }
        let value = match (name, iota) {
            ("iota", Some(iota)) => ConstValue::Int(iota),
            ("true", _) => ConstValue::Bool(true),
            ("false", _) => ConstValue::Bool(false),
            _ => ConstValue::Unknown,
        };
        Typed::untyped(value)
    }

    fn eval_call(
        &mut self,
        func: &Expr,
        args: &[Expr],
        iota: Option<i128>,
        locals: &Locals,
    ) -> Typed {
        let mut operands: Vec<Typed> = args
            .iter()
            .map(|arg| self.eval_typed(arg, iota, locals))
            .collect();

        match func.as_ident() {
            Some("len") => match operands.as_slice() {
                [Typed { value: ConstValue::Str(s), .. }] => {
                    Typed::with_type(ConstValue::Int(s.len() as i128), IntType::predeclared("int"))
                }
                _ => Typed::unknown(),
            },
            Some(builtin @ ("min" | "max")) => extremum(operands, builtin == "min"),
            _ => match operands.pop() {
                Some(operand) if operands.is_empty() => self.convert(func, operand),
                _ => Typed::unknown(),
            },
        }
    }

    /// Conversion `T(x)`.
    ///
    /// Integer types check that the value fits and give it their width.
    /// String types turn integers into the UTF-8 text of that code point.
    fn convert(&self, ty: &Expr, operand: Typed) -> Typed {
        match (self.classify(ty, 0), operand.value) {
            (Some(TypeClass::String), ConstValue::Int(code)) => {
                let c = u32::try_from(code)
                    .ok()
                    .and_then(char::from_u32)
                    .unwrap_or('\u{FFFD}');
                Typed::untyped(ConstValue::Str(c.to_string()))
            }
            (Some(TypeClass::Int(int)), value @ ConstValue::Int(_)) => {
                Typed::with_type(value, Some(int))
            }
            (Some(TypeClass::Int(_)), _) => Typed::unknown(),
            (Some(TypeClass::String | TypeClass::Other), value) => Typed::untyped(value),
            (None, value) => Typed::with_type(value, Some(IntType::Opaque)),
        }
    }

    /// Class of a type expression; `None` for types of other packages
    fn classify(&self, ty: &Expr, depth: usize) -> Option<TypeClass> {
        if depth > 16 {
            return None;
        }
        match &ty.kind {
            ExprKind::Paren(inner) => self.classify(inner, depth + 1),
            ExprKind::Ident(name) => {
                if let Some(underlying) = self.types.get(name.as_str()) {
                    return self.classify(underlying, depth + 1);
                }
                if let Some(int) = IntType::predeclared(name) {
                    return Some(TypeClass::Int(int));
                }
                match name.as_str() {
                    "string" => Some(TypeClass::String),
                    "bool" | "float32" | "float64" | "complex64" | "complex128" => {
                        Some(TypeClass::Other)
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

fn eval_literal(lit: &BasicLit) -> ConstValue {
    let value = match lit.kind {
        LitKind::Int => parse_int_lit(&lit.value).map(ConstValue::Int),
        LitKind::Char => parse_char_lit(&lit.value).map(ConstValue::Int),
        LitKind::String => parse_string_lit(&lit.value).map(ConstValue::Str),
        LitKind::Float | LitKind::Imag => None,
    };
    value.unwrap_or(ConstValue::Unknown)
}

fn eval_unary(op: UnaryOp, operand: Typed) -> Typed {
    let Typed { value, ty } = operand;
    let value = match (op, value) {
        (UnaryOp::Plus, value @ ConstValue::Int(_)) => value,
        (UnaryOp::Neg, ConstValue::Int(v)) => {
            v.checked_neg().map_or(ConstValue::Unknown, ConstValue::Int)
        }
        (UnaryOp::Xor, ConstValue::Int(v)) => match ty {
            Some(IntType::Sized { bits, signed: false }) => ConstValue::Int(v ^ ((1i128 << bits) - 1)),
            Some(IntType::Opaque) => ConstValue::Unknown,
            _ => ConstValue::Int(!v),
        },
        (UnaryOp::Not, ConstValue::Bool(b)) => ConstValue::Bool(!b),
        _ => ConstValue::Unknown,
    };
    Typed::with_type(value, ty)
}

fn eval_binary(op: BinaryOp, lhs: Typed, rhs: Typed) -> Typed {
    use ConstValue::{Bool, Int, Str};

    // Shifts keep the type of their left operand
    let ty = match op {
        BinaryOp::Shl | BinaryOp::Shr => lhs.ty,
        _ => lhs.ty.or(rhs.ty),
    };

    let result = match (lhs.value, rhs.value) {
        (Int(a), Int(b)) => match op {
            BinaryOp::Add => a.checked_add(b).map(Int),
            BinaryOp::Sub => a.checked_sub(b).map(Int),
            BinaryOp::Mul => a.checked_mul(b).map(Int),
            BinaryOp::Div => a.checked_div(b).map(Int),
            BinaryOp::Rem => a.checked_rem(b).map(Int),
            BinaryOp::And => Some(Int(a & b)),
            BinaryOp::Or => Some(Int(a | b)),
            BinaryOp::Xor => Some(Int(a ^ b)),
            BinaryOp::AndNot => Some(Int(a & !b)),
            BinaryOp::Shl => shift_left(a, b).map(Int),
            BinaryOp::Shr => u32::try_from(b).ok().map(|s| Int(a >> s.min(127))),
            BinaryOp::Eq => Some(Bool(a == b)),
            BinaryOp::Ne => Some(Bool(a != b)),
            BinaryOp::Lt => Some(Bool(a < b)),
            BinaryOp::Le => Some(Bool(a <= b)),
            BinaryOp::Gt => Some(Bool(a > b)),
            BinaryOp::Ge => Some(Bool(a >= b)),
            BinaryOp::LogAnd | BinaryOp::LogOr => None,
        },
        (Str(a), Str(b)) => match op {
            BinaryOp::Add => Some(Str(a + &b)),
            BinaryOp::Eq => Some(Bool(a == b)),
            BinaryOp::Ne => Some(Bool(a != b)),
            BinaryOp::Lt => Some(Bool(a < b)),
            BinaryOp::Le => Some(Bool(a <= b)),
            BinaryOp::Gt => Some(Bool(a > b)),
            BinaryOp::Ge => Some(Bool(a >= b)),
            _ => None,
        },
        (Bool(a), Bool(b)) => match op {
            BinaryOp::LogAnd => Some(Bool(a && b)),
            BinaryOp::LogOr => Some(Bool(a || b)),
            BinaryOp::Eq => Some(Bool(a == b)),
            BinaryOp::Ne => Some(Bool(a != b)),
            _ => None,
        },
        _ => None,
    };

    Typed::with_type(result.unwrap_or(ConstValue::Unknown), ty)
}

fn shift_left(value: i128, amount: i128) -> Option<i128> {
    let amount = u32::try_from(amount).ok()?;
    if value == 0 {
        return Some(0);
    }
    let shifted = value.checked_shl(amount)?;
    // Bits shifted out mean the exact value does not fit
    (shifted >> amount == value).then_some(shifted)
}

fn extremum(operands: Vec<Typed>, min: bool) -> Typed {
    let mut iter = operands.into_iter();
    let Some(mut best) = iter.next() else {
        return Typed::unknown();
    };
    let mut ty = best.ty;

    for operand in iter {
        ty = ty.or(operand.ty);
        let replace = match (&best.value, &operand.value) {
            (ConstValue::Int(a), ConstValue::Int(b)) => (b < a) == min && b != a,
            (ConstValue::Str(a), ConstValue::Str(b)) => (b < a) == min && b != a,
            _ => return Typed::unknown(),
        };
        if replace {
            best = operand;
        }
    }

    Typed::with_type(best.value, ty)
}

#[cfg(test)]
#[path = "consteval_tests.rs"]
mod tests;
