//! Type representation for the Tova analyzer.
//!
//! Defines the [`Ty`] algebra, its canonical string encoding (the `Display`
//! impl) and decoder ([`Ty::parse`]), generic-binding inference and
//! substitution, and the gradual compatibility predicate. Types travel
//! between components as canonical strings; symbols store the encoded form
//! and the analyzer decodes on demand.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::registry::TypeRegistry;

/// A Tova type.
///
/// The algebra is gradual: `Any` is the top type and `Unknown` (`_`) is the
/// "no information" placeholder produced by failed or partial inference.
/// Named ADTs and records appear as [`Ty::Name`] (uninstantiated) or
/// [`Ty::Generic`] (instantiated); their structure lives in the
/// [`TypeRegistry`], not in the type itself.
#[derive(Clone, Debug, PartialEq)]
pub enum Ty {
    /// A named type: a primitive (`Int`, `Float`, `String`, `Bool`) or a
    /// declared type referenced without parameters.
    Name(String),
    /// The nil type.
    Nil,
    /// The top type: compatible with everything.
    Any,
    /// The `_` wildcard: no information, compatible with everything.
    Unknown,
    /// An array `[T]`.
    Array(Box<Ty>),
    /// A tuple `(T, U)`.
    Tuple(Vec<Ty>),
    /// A function `(T, U) -> R`.
    Fun(Vec<Ty>, Box<Ty>),
    /// An anonymous record `{name: T, age: U}`. Fields keep declaration order.
    Record(Vec<(String, Ty)>),
    /// A parameterized type `Name<T, U>`.
    Generic(String, Vec<Ty>),
    /// A bound type parameter inside a generic function signature.
    Var(String),
    /// A union `A | B`.
    Union(Vec<Ty>),
}

impl Ty {
    pub fn int() -> Ty {
        Ty::Name("Int".into())
    }

    pub fn float() -> Ty {
        Ty::Name("Float".into())
    }

    pub fn string() -> Ty {
        Ty::Name("String".into())
    }

    pub fn bool() -> Ty {
        Ty::Name("Bool".into())
    }

    pub fn array(elem: Ty) -> Ty {
        Ty::Array(Box::new(elem))
    }

    pub fn option(inner: Ty) -> Ty {
        Ty::Generic("Option".into(), vec![inner])
    }

    pub fn result(ok: Ty, err: Ty) -> Ty {
        Ty::Generic("Result".into(), vec![ok, err])
    }

    pub fn fun(params: Vec<Ty>, ret: Ty) -> Ty {
        Ty::Fun(params, Box::new(ret))
    }

    /// The base name of a named or parameterized type.
    pub fn base_name(&self) -> Option<&str> {
        match self {
            Ty::Name(n) => Some(n),
            Ty::Generic(n, _) => Some(n),
            _ => None,
        }
    }

    /// Whether this is `Any` or `Unknown` — the two gradual escape hatches.
    pub fn is_gradual(&self) -> bool {
        matches!(self, Ty::Any | Ty::Unknown)
    }

    /// Build a union, flattening nested unions and deduplicating members.
    /// A single surviving member collapses to itself.
    pub fn union_of(members: Vec<Ty>) -> Ty {
        let mut flat: Vec<Ty> = Vec::new();
        for m in members {
            match m {
                Ty::Union(inner) => {
                    for t in inner {
                        if !flat.contains(&t) {
                            flat.push(t);
                        }
                    }
                }
                other => {
                    if !flat.contains(&other) {
                        flat.push(other);
                    }
                }
            }
        }
        match flat.len() {
            0 => Ty::Unknown,
            1 => flat.remove(0),
            _ => Ty::Union(flat),
        }
    }

    /// Remove `Nil` from a union, or unwrap `Option<T>` to `T`.
    /// Types with no nil-ness pass through unchanged.
    pub fn strip_nil(&self) -> Ty {
        match self {
            Ty::Union(members) => {
                let kept: Vec<Ty> = members.iter().filter(|m| !matches!(m, Ty::Nil)).cloned().collect();
                Ty::union_of(kept)
            }
            Ty::Generic(name, args) if name == "Option" && args.len() == 1 => args[0].clone(),
            other => other.clone(),
        }
    }

    /// Whether the encoded form of this type mentions `Nil` at the top
    /// level of a union.
    pub fn contains_nil(&self) -> bool {
        match self {
            Ty::Nil => true,
            Ty::Union(members) => members.iter().any(|m| matches!(m, Ty::Nil)),
            _ => false,
        }
    }
}

// ── Canonical encoding ───────────────────────────────────────────────────

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Name(n) => write!(f, "{}", n),
            Ty::Nil => write!(f, "Nil"),
            Ty::Any => write!(f, "Any"),
            Ty::Unknown => write!(f, "_"),
            Ty::Array(elem) => write!(f, "[{}]", elem),
            Ty::Tuple(elems) => {
                write!(f, "(")?;
                for (i, e) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", e)?;
                }
                if elems.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Ty::Fun(params, ret) => {
                write!(f, "(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ") -> {}", ret)
            }
            Ty::Record(fields) => {
                write!(f, "{{")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, ty)?;
                }
                write!(f, "}}")
            }
            Ty::Generic(name, args) => {
                write!(f, "{}", name)?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, a) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", a)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            Ty::Var(name) => write!(f, "{}", name),
            Ty::Union(members) => {
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", m)?;
                }
                Ok(())
            }
        }
    }
}

// ── Canonical decoding ───────────────────────────────────────────────────

struct TyParser<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> TyParser<'a> {
    fn new(src: &'a str) -> Self {
        TyParser { src: src.as_bytes(), pos: 0 }
    }

    fn skip_ws(&mut self) {
        while self.pos < self.src.len() && self.src[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.src.get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_arrow(&mut self) -> bool {
        self.skip_ws();
        if self.src[self.pos..].starts_with(b"->") {
            self.pos += 2;
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Option<String> {
        self.skip_ws();
        let start = self.pos;
        while self.pos < self.src.len()
            && (self.src[self.pos].is_ascii_alphanumeric() || self.src[self.pos] == b'_')
        {
            self.pos += 1;
        }
        if self.pos == start {
            None
        } else {
            Some(String::from_utf8_lossy(&self.src[start..self.pos]).into_owned())
        }
    }

    /// union := member ('|' member)*
    fn ty(&mut self) -> Option<Ty> {
        let first = self.member()?;
        let mut members = vec![first];
        while self.eat(b'|') {
            members.push(self.member()?);
        }
        if members.len() == 1 {
            Some(members.remove(0))
        } else {
            Some(Ty::Union(members))
        }
    }

    /// member := '[' ty ']' | '(' ... ')' ['->' member] | '{' fields '}'
    ///         | '_' | name ['<' ty (',' ty)* '>']
    fn member(&mut self) -> Option<Ty> {
        match self.peek()? {
            b'[' => {
                self.pos += 1;
                let elem = self.ty()?;
                self.eat(b']').then(|| Ty::array(elem))
            }
            b'(' => {
                self.pos += 1;
                let mut elems = Vec::new();
                let mut trailing_comma = false;
                if self.peek() != Some(b')') {
                    loop {
                        elems.push(self.ty()?);
                        if self.eat(b',') {
                            if self.peek() == Some(b')') {
                                trailing_comma = true;
                                break;
                            }
                            continue;
                        }
                        break;
                    }
                }
                if !self.eat(b')') {
                    return None;
                }
                if self.eat_arrow() {
                    let ret = self.member()?;
                    return Some(Ty::fun(elems, ret));
                }
                // "(T)" is a grouped type; "(T,)" and "(A, B)" are tuples.
                if elems.len() == 1 && !trailing_comma {
                    Some(elems.remove(0))
                } else {
                    Some(Ty::Tuple(elems))
                }
            }
            b'{' => {
                self.pos += 1;
                let mut fields = Vec::new();
                if self.peek() != Some(b'}') {
                    loop {
                        let name = self.ident()?;
                        if !self.eat(b':') {
                            return None;
                        }
                        fields.push((name, self.ty()?));
                        if !self.eat(b',') {
                            break;
                        }
                    }
                }
                self.eat(b'}').then_some(Ty::Record(fields))
            }
            _ => {
                let name = self.ident()?;
                match name.as_str() {
                    "_" => return Some(Ty::Unknown),
                    "Any" => return Some(Ty::Any),
                    "Nil" => return Some(Ty::Nil),
                    _ => {}
                }
                if self.eat(b'<') {
                    let mut args = vec![self.ty()?];
                    while self.eat(b',') {
                        args.push(self.ty()?);
                    }
                    if !self.eat(b'>') {
                        return None;
                    }
                    Some(Ty::Generic(name, args))
                } else {
                    Some(Ty::Name(name))
                }
            }
        }
    }
}

impl Ty {
    /// Decode a canonical type string. Returns `None` on malformed input.
    pub fn parse(src: &str) -> Option<Ty> {
        let mut p = TyParser::new(src);
        let ty = p.ty()?;
        p.skip_ws();
        (p.pos == p.src.len()).then_some(ty)
    }
}

// ── Generic binding inference & substitution ─────────────────────────────

/// Walk a parameter annotation and a supplied argument type in lockstep,
/// binding each still-unbound type parameter to the actual type at the
/// same position.
pub fn infer_bindings(
    annotated: &Ty,
    actual: &Ty,
    type_params: &[String],
    bindings: &mut FxHashMap<String, Ty>,
) {
    match (annotated, actual) {
        (Ty::Name(n), _) | (Ty::Var(n), _) if type_params.iter().any(|p| p == n) => {
            bindings.entry(n.clone()).or_insert_with(|| actual.clone());
        }
        (Ty::Array(a), Ty::Array(b)) => infer_bindings(a, b, type_params, bindings),
        (Ty::Tuple(a), Ty::Tuple(b)) if a.len() == b.len() => {
            for (x, y) in a.iter().zip(b) {
                infer_bindings(x, y, type_params, bindings);
            }
        }
        (Ty::Generic(n1, a), Ty::Generic(n2, b)) if n1 == n2 && a.len() == b.len() => {
            for (x, y) in a.iter().zip(b) {
                infer_bindings(x, y, type_params, bindings);
            }
        }
        (Ty::Fun(p1, r1), Ty::Fun(p2, r2)) if p1.len() == p2.len() => {
            for (x, y) in p1.iter().zip(p2) {
                infer_bindings(x, y, type_params, bindings);
            }
            infer_bindings(r1, r2, type_params, bindings);
        }
        (Ty::Union(a), Ty::Union(b)) if a.len() == b.len() => {
            for (x, y) in a.iter().zip(b) {
                infer_bindings(x, y, type_params, bindings);
            }
        }
        _ => {}
    }
}

/// Substitute bound type parameters throughout a type. Unbound parameters
/// become `_` so downstream checks treat those slots gradually.
pub fn substitute(ty: &Ty, type_params: &[String], bindings: &FxHashMap<String, Ty>) -> Ty {
    match ty {
        Ty::Name(n) | Ty::Var(n) if type_params.iter().any(|p| p == n) => {
            bindings.get(n).cloned().unwrap_or(Ty::Unknown)
        }
        Ty::Array(elem) => Ty::array(substitute(elem, type_params, bindings)),
        Ty::Tuple(elems) => Ty::Tuple(elems.iter().map(|e| substitute(e, type_params, bindings)).collect()),
        Ty::Fun(params, ret) => Ty::fun(
            params.iter().map(|p| substitute(p, type_params, bindings)).collect(),
            substitute(ret, type_params, bindings),
        ),
        Ty::Record(fields) => Ty::Record(
            fields
                .iter()
                .map(|(n, t)| (n.clone(), substitute(t, type_params, bindings)))
                .collect(),
        ),
        Ty::Generic(name, args) => Ty::Generic(
            name.clone(),
            args.iter().map(|a| substitute(a, type_params, bindings)).collect(),
        ),
        Ty::Union(members) => {
            Ty::union_of(members.iter().map(|m| substitute(m, type_params, bindings)).collect())
        }
        other => other.clone(),
    }
}

// ── Compatibility ────────────────────────────────────────────────────────

/// The gradual compatibility predicate: may a value of type `actual` flow
/// into a slot expecting `expected`?
///
/// `Int -> Float` widening is allowed; `Float -> Int` narrowing is not
/// (callers decide whether that failure is the W204 data-loss case).
/// Aliases are resolved through the registry before comparison.
pub fn compatible(expected: &Ty, actual: &Ty, registry: &TypeRegistry) -> bool {
    let expected = registry.resolve_alias(expected);
    let actual = registry.resolve_alias(actual);

    if expected.is_gradual() || actual.is_gradual() {
        return true;
    }
    if expected == actual {
        return true;
    }

    match (&expected, &actual) {
        // Int widens to Float.
        (Ty::Name(e), Ty::Name(a)) if e == "Float" && a == "Int" => true,

        // Nil flows into Option<T> and into unions that mention Nil.
        (Ty::Generic(name, _), Ty::Nil) if name == "Option" => true,
        (Ty::Union(members), Ty::Nil) if members.iter().any(|m| matches!(m, Ty::Nil)) => true,

        // A union expectation accepts anything one member accepts.
        (Ty::Union(members), _) => members.iter().any(|m| compatible(m, &actual, registry)),

        // A union value needs every member to fit.
        (_, Ty::Union(members)) => members.iter().all(|m| compatible(&expected, m, registry)),

        (Ty::Array(e), Ty::Array(a)) => compatible(e, a, registry),

        (Ty::Tuple(e), Ty::Tuple(a)) if e.len() == a.len() => {
            e.iter().zip(a).all(|(x, y)| compatible(x, y, registry))
        }

        // A bare name and its zero-arg instantiation are the same type.
        (Ty::Name(n1), Ty::Generic(n2, args)) | (Ty::Generic(n2, args), Ty::Name(n1))
            if n1 == n2 && args.is_empty() =>
        {
            true
        }

        // Same generic base: uninstantiated sides are gradual, otherwise
        // parameters check pairwise.
        (Ty::Generic(n1, a1), Ty::Generic(n2, a2)) if n1 == n2 => {
            if a1.is_empty() || a2.is_empty() {
                true
            } else {
                a1.len() == a2.len() && a1.iter().zip(a2).all(|(x, y)| compatible(x, y, registry))
            }
        }

        // An uninstantiated reference to a parameterized type is gradual.
        (Ty::Name(n1), Ty::Generic(n2, _)) | (Ty::Generic(n1, _), Ty::Name(n2)) if n1 == n2 => true,

        (Ty::Fun(p1, r1), Ty::Fun(p2, r2)) if p1.len() == p2.len() => {
            p1.iter().zip(p2).all(|(x, y)| compatible(x, y, registry))
                && compatible(r1, r2, registry)
        }

        // A record value satisfies a named record type structurally:
        // every declared field is present and compatible.
        (Ty::Name(name), Ty::Record(actual_fields))
        | (Ty::Generic(name, _), Ty::Record(actual_fields)) => {
            match registry.lookup_type(name).and_then(|d| d.fields()) {
                Some(fields) => fields.iter().all(|f| {
                    let Some(fname) = &f.name else { return true };
                    match actual_fields.iter().find(|(n, _)| n == fname) {
                        Some((_, actual_ty)) => Ty::parse(&f.ty)
                            .map_or(true, |exp| compatible(&exp, actual_ty, registry)),
                        None => false,
                    }
                }),
                None => false,
            }
        }

        // A narrowed variant-as-type value still belongs to its ADT:
        // `Ok<Int>` flows into `Result<Int, E>`.
        (expected, actual) => {
            if let (Some(adt), Some(variant)) = (expected.base_name(), actual.base_name()) {
                if let Some(def) = registry.lookup_type(adt) {
                    if let Some(variants) = def.variants() {
                        return variants.iter().any(|v| v.name == variant);
                    }
                }
            }
            false
        }
    }
}

/// Whether this pair is the `Int <- Float` narrowing case — rejected by
/// [`compatible`], but reported as data loss (W204) rather than a plain
/// mismatch outside strict mode.
pub fn is_float_narrowing(expected: &Ty, actual: &Ty) -> bool {
    matches!((expected, actual), (Ty::Name(e), Ty::Name(a)) if e == "Int" && a == "Float")
}
