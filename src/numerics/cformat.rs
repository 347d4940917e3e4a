//! C-style Formatter
//! printf-like conversions (`%d`, `%12.5e`, `%-8s`, `%g`, ...) with C exponent notation.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("Incomplete conversion specification at byte {0}")]
    Incomplete(usize),
    #[error("Unsupported conversion character '{0}'")]
    UnsupportedConversion(char),
    #[error("Format expects {expected} arguments, got {got}")]
    ArgumentCount { expected: usize, got: usize },
    #[error("Cannot format \"{0}\" with a numeric conversion")]
    NotNumeric(String),
    #[error("Cannot format {0} as an integer")]
    NotInteger(f64),
}

/// A value to substitute into a format.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<i64> for Arg {
    fn from(v: i64) -> Self {
        Arg::Int(v)
    }
}

impl From<i32> for Arg {
    fn from(v: i32) -> Self {
        Arg::Int(v as i64)
    }
}

impl From<usize> for Arg {
    fn from(v: usize) -> Self {
        Arg::Int(v as i64)
    }
}

impl From<f64> for Arg {
    fn from(v: f64) -> Self {
        Arg::Float(v)
    }
}

impl From<&str> for Arg {
    fn from(v: &str) -> Self {
        Arg::Str(v.to_string())
    }
}

impl From<String> for Arg {
    fn from(v: String) -> Self {
        Arg::Str(v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    Int,
    Fixed,
    Exp { upper: bool },
    General { upper: bool },
    Str,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub left: bool,
    pub zero: bool,
    pub plus: bool,
    pub space: bool,
    pub alt: bool,
}

/// A single `%...` conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spec {
    pub flags: Flags,
    pub width: Option<usize>,
    pub precision: Option<usize>,
    pub conversion: Conversion,
}

#[derive(Debug, Clone, PartialEq)]
enum Piece {
    Literal(String),
    Spec(Spec),
}

/// A parsed printf-style format string.
#[derive(Debug, Clone, PartialEq)]
pub struct CFormat {
    pieces: Vec<Piece>,
}

impl CFormat {
    /// Parse a format string. Length modifiers (`h`, `l`, `L`, ...) are accepted and ignored.
    pub fn parse(fmt: &str) -> Result<Self, FormatError> {
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut chars = fmt.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }
            if let Some(&(_, '%')) = chars.peek() {
                chars.next();
                literal.push('%');
                continue;
            }

            let mut flags = Flags::default();
            while let Some(&(_, f)) = chars.peek() {
                match f {
                    '-' => flags.left = true,
                    '0' => flags.zero = true,
                    '+' => flags.plus = true,
                    ' ' => flags.space = true,
                    '#' => flags.alt = true,
                    _ => break,
                }
                chars.next();
            }

            let width = Self::parse_number(&mut chars);
            let precision = if let Some(&(_, '.')) = chars.peek() {
                chars.next();
                Some(Self::parse_number(&mut chars).unwrap_or(0))
            } else {
                None
            };

            while let Some(&(_, m)) = chars.peek() {
                if matches!(m, 'h' | 'l' | 'L' | 'q' | 'j' | 'z' | 't') {
                    chars.next();
                } else {
                    break;
                }
            }

            let (_, conv) = chars.next().ok_or(FormatError::Incomplete(pos))?;
            let conversion = match conv {
                'd' | 'i' | 'u' => Conversion::Int,
                'f' | 'F' => Conversion::Fixed,
                'e' => Conversion::Exp { upper: false },
                'E' => Conversion::Exp { upper: true },
                'g' => Conversion::General { upper: false },
                'G' => Conversion::General { upper: true },
                's' => Conversion::Str,
                other => return Err(FormatError::UnsupportedConversion(other)),
            };

            if !literal.is_empty() {
                pieces.push(Piece::Literal(std::mem::take(&mut literal)));
            }
            pieces.push(Piece::Spec(Spec {
                flags,
                width,
                precision,
                conversion,
            }));
        }

        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }
        Ok(Self { pieces })
    }

    fn parse_number(
        chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    ) -> Option<usize> {
        let mut value: Option<usize> = None;
        while let Some(&(_, d)) = chars.peek() {
            let Some(digit) = d.to_digit(10) else {
                break;
            };
            value = Some(value.unwrap_or(0) * 10 + digit as usize);
            chars.next();
        }
        value
    }

    /// Number of arguments this format consumes.
    pub fn arg_count(&self) -> usize {
        self.pieces
            .iter()
            .filter(|p| matches!(p, Piece::Spec(_)))
            .count()
    }

    /// Conversion specs in order of appearance.
    pub fn specs(&self) -> impl Iterator<Item = &Spec> {
        self.pieces.iter().filter_map(|p| match p {
            Piece::Spec(s) => Some(s),
            Piece::Literal(_) => None,
        })
    }

    /// The matching header format: every conversion becomes `%s` with the same width and
    /// alignment, so that column titles line up with the values.
    pub fn header_format(&self) -> CFormat {
        let pieces = self
            .pieces
            .iter()
            .map(|p| match p {
                Piece::Literal(s) => Piece::Literal(s.clone()),
                Piece::Spec(spec) => Piece::Spec(Spec {
                    flags: Flags {
                        left: spec.flags.left,
                        ..Flags::default()
                    },
                    width: spec.width,
                    precision: None,
                    conversion: Conversion::Str,
                }),
            })
            .collect();
        CFormat { pieces }
    }

    pub fn format(&self, args: &[Arg]) -> Result<String, FormatError> {
        let expected = self.arg_count();
        if expected != args.len() {
            return Err(FormatError::ArgumentCount {
                expected,
                got: args.len(),
            });
        }

        let mut out = String::new();
        let mut args = args.iter();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(s) => out.push_str(s),
                Piece::Spec(spec) => {
                    // Counts were checked above.
                    if let Some(arg) = args.next() {
                        out.push_str(&format_arg(spec, arg)?);
                    }
                }
            }
        }
        Ok(out)
    }
}

/// Parse and apply a format in one go.
pub fn sprintf(fmt: &str, args: &[Arg]) -> Result<String, FormatError> {
    CFormat::parse(fmt)?.format(args)
}

/// Format a single argument according to a conversion spec.
pub fn format_arg(spec: &Spec, arg: &Arg) -> Result<String, FormatError> {
    if spec.conversion == Conversion::Str {
        let mut s = match arg {
            Arg::Int(v) => v.to_string(),
            Arg::Float(v) => float_repr(*v),
            Arg::Str(v) => v.clone(),
        };
        if let Some(p) = spec.precision {
            s = s.chars().take(p).collect();
        }
        return Ok(pad(String::new(), s, spec, false));
    }

    let value = match arg {
        Arg::Int(v) => Number::Int(*v),
        Arg::Float(v) => Number::Float(*v),
        Arg::Str(s) => return Err(FormatError::NotNumeric(s.clone())),
    };

    let (negative, body, finite) = match (spec.conversion, value) {
        (Conversion::Int, Number::Int(v)) => (v < 0, int_digits(v.unsigned_abs().to_string(), spec), true),
        (Conversion::Int, Number::Float(v)) => {
            if !v.is_finite() {
                return Err(FormatError::NotInteger(v));
            }
            let t = v.trunc();
            (t < 0.0, int_digits(format!("{:.0}", t.abs()), spec), true)
        }
        (conv, num) => {
            let v = match num {
                Number::Int(i) => i as f64,
                Number::Float(f) => f,
            };
            let negative = v.is_sign_negative() && !v.is_nan();
            let a = v.abs();
            if !a.is_finite() {
                let upper = matches!(
                    conv,
                    Conversion::Exp { upper: true } | Conversion::General { upper: true }
                );
                let s = if a.is_nan() { "nan" } else { "inf" };
                let s = if upper { s.to_uppercase() } else { s.to_string() };
                (negative, s, false)
            } else {
                let body = match conv {
                    Conversion::Fixed => {
                        let p = spec.precision.unwrap_or(6);
                        let mut s = format!("{:.*}", p, a);
                        if p == 0 && spec.flags.alt {
                            s.push('.');
                        }
                        s
                    }
                    Conversion::Exp { upper } => format_exp(a, spec.precision.unwrap_or(6), upper),
                    Conversion::General { upper } => {
                        format_general(a, spec.precision.unwrap_or(6), upper, spec.flags.alt)
                    }
                    Conversion::Int | Conversion::Str => unreachable!("handled above"),
                };
                (negative, body, true)
            }
        }
    };

    let sign = if negative {
        "-"
    } else if spec.flags.plus {
        "+"
    } else if spec.flags.space {
        " "
    } else {
        ""
    };
    Ok(pad(sign.to_string(), body, spec, finite))
}

#[derive(Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

fn int_digits(digits: String, spec: &Spec) -> String {
    match spec.precision {
        Some(p) if digits.len() < p => format!("{}{}", "0".repeat(p - digits.len()), digits),
        _ => digits,
    }
}

fn pad(sign: String, body: String, spec: &Spec, zero_allowed: bool) -> String {
    let len = sign.chars().count() + body.chars().count();
    let width = spec.width.unwrap_or(0);
    if len >= width {
        return sign + &body;
    }
    let fill = width - len;
    if spec.flags.left {
        format!("{}{}{}", sign, body, " ".repeat(fill))
    } else if spec.flags.zero && zero_allowed {
        format!("{}{}{}", sign, "0".repeat(fill), body)
    } else {
        format!("{}{}{}", " ".repeat(fill), sign, body)
    }
}

/// Shortest round-trip text of a float, always with a decimal point or an exponent.
///
/// Magnitudes from 1e16 up or below 1e-4 use an exponent with a sign and at least two digits,
/// so 1.0 prints as `1.0` and 1e20 as `1e+20`.
pub fn float_repr(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let a = v.abs();
    if a != 0.0 && !(1e-4..1e16).contains(&a) {
        let s = format!("{v:e}");
        let (mantissa, exp) = s.split_once('e').unwrap_or((s.as_str(), "0"));
        let (sign, digits) = match exp.strip_prefix('-') {
            Some(d) => ('-', d),
            None => ('+', exp),
        };
        return format!("{mantissa}e{sign}{digits:0>2}");
    }
    let s = v.to_string();
    if s.contains('.') {
        s
    } else {
        s + ".0"
    }
}

/// `%.{precision}e` of a non-negative finite value, with a signed exponent of at least two digits.
pub fn format_exp(value: f64, precision: usize, upper: bool) -> String {
    let (mantissa, exponent) = split_exp(value, precision);
    let e = if upper { 'E' } else { 'e' };
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{}{}{}{:02}", mantissa, e, sign, exponent.unsigned_abs())
}

fn split_exp(value: f64, precision: usize) -> (String, i32) {
    let s = format!("{:.*e}", precision, value);
    match s.split_once('e') {
        Some((m, e)) => (m.to_string(), e.parse().unwrap_or(0)),
        None => (s, 0),
    }
}

/// `%.{precision}g` of a non-negative finite value.
pub fn format_general(value: f64, precision: usize, upper: bool, keep_zeros: bool) -> String {
    let p = precision.max(1);
    let exponent = if value == 0.0 {
        0
    } else {
        split_exp(value, p - 1).1
    };

    if exponent >= -4 && exponent < p as i32 {
        let decimals = (p as i32 - 1 - exponent).max(0) as usize;
        let s = format!("{:.*}", decimals, value);
        if keep_zeros {
            s
        } else {
            strip_zeros(&s)
        }
    } else {
        let s = format_exp(value, p - 1, upper);
        if keep_zeros {
            return s;
        }
        let idx = s.find(['e', 'E']).unwrap_or(s.len());
        let (mantissa, exp) = s.split_at(idx);
        format!("{}{}", strip_zeros(mantissa), exp)
    }
}

fn strip_zeros(s: &str) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s.to_string()
    }
}

/// Shorthand for `%.{precision}g`, including the sign.
pub fn format_g(value: f64, precision: usize) -> String {
    let spec = Spec {
        flags: Flags::default(),
        width: None,
        precision: Some(precision),
        conversion: Conversion::General { upper: false },
    };
    // A float argument with a numeric conversion cannot fail.
    format_arg(&spec, &Arg::Float(value)).unwrap_or_else(|_| value.to_string())
}
