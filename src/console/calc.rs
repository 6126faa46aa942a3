//! Arithmetic for the `calc` command.
//!
//! Input is screened against a strict allow-list before any parsing happens:
//! digits, `.`, whitespace, parentheses and the four operators. Anything else is
//! rejected outright. Evaluation is a small recursive-descent parser over the
//! usual precedence (unary sign > `* /` > `+ -`).

use crate::error::CalcError;

/// Combined limit on open parentheses and stacked unary signs.
const MAX_NESTING: usize = 64;

fn allowed(c: char) -> bool {
    c.is_ascii_digit() || c.is_ascii_whitespace() || matches!(c, '.' | '(' | ')' | '+' | '-' | '*' | '/')
}

pub fn evaluate(expr: &str) -> Result<f64, CalcError> {
    if !expr.chars().all(allowed) {
        return Err(CalcError::InvalidCharacters);
    }
    let tokens: Vec<(usize, u8)> = expr
        .bytes()
        .enumerate()
        .filter(|(_, b)| !b.is_ascii_whitespace())
        .collect();
    if tokens.is_empty() {
        return Err(CalcError::Empty);
    }
    let mut parser = Parser { tokens: &tokens, pos: 0, depth: 0, nesting: 0 };
    let value = parser.expr()?;
    match parser.peek() {
        None => Ok(value),
        Some(b')') => Err(CalcError::Unbalanced),
        Some(_) => Err(CalcError::UnexpectedToken(parser.offset())),
    }
}

/// Integral results print without a fractional part.
pub fn format_result(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

struct Parser<'a> {
    // (byte offset in the original input, byte) with whitespace removed
    tokens: &'a [(usize, u8)],
    pos: usize,
    // open parentheses
    depth: usize,
    // parentheses plus unary signs, bounded by MAX_NESTING
    nesting: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<u8> {
        self.tokens.get(self.pos).map(|&(_, b)| b)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map(|&(o, _)| o).unwrap_or_else(|| {
            self.tokens.last().map(|&(o, _)| o + 1).unwrap_or(0)
        })
    }

    fn enter(&mut self) -> Result<(), CalcError> {
        if self.nesting >= MAX_NESTING {
            return Err(CalcError::TooDeep);
        }
        self.nesting += 1;
        Ok(())
    }

    fn expr(&mut self) -> Result<f64, CalcError> {
        let mut acc = self.term()?;
        while let Some(op @ (b'+' | b'-')) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            acc = if op == b'+' { acc + rhs } else { acc - rhs };
        }
        Ok(acc)
    }

    fn term(&mut self) -> Result<f64, CalcError> {
        let mut acc = self.factor()?;
        while let Some(op @ (b'*' | b'/')) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            if op == b'*' {
                acc *= rhs;
            } else if rhs == 0.0 {
                return Err(CalcError::DivisionByZero);
            } else {
                acc /= rhs;
            }
        }
        Ok(acc)
    }

    fn factor(&mut self) -> Result<f64, CalcError> {
        match self.peek() {
            Some(sign @ (b'-' | b'+')) => {
                self.pos += 1;
                self.enter()?;
                let value = self.factor()?;
                self.nesting -= 1;
                Ok(if sign == b'-' { -value } else { value })
            }
            Some(b'(') => {
                self.pos += 1;
                self.enter()?;
                self.depth += 1;
                let inner = self.expr()?;
                if self.peek() != Some(b')') {
                    return Err(CalcError::Unbalanced);
                }
                self.pos += 1;
                self.depth -= 1;
                self.nesting -= 1;
                Ok(inner)
            }
            Some(b) if b.is_ascii_digit() || b == b'.' => self.number(),
            Some(b')') if self.depth == 0 => Err(CalcError::Unbalanced),
            _ => Err(CalcError::UnexpectedToken(self.offset())),
        }
    }

    fn number(&mut self) -> Result<f64, CalcError> {
        let start = self.pos;
        let mut text = String::new();
        while let Some(b) = self.peek() {
            if !(b.is_ascii_digit() || b == b'.') {
                break;
            }
            // Whitespace was stripped, so "1 2" must not fuse into 12.
            if self.pos > start && self.tokens[self.pos].0 != self.tokens[self.pos - 1].0 + 1 {
                break;
            }
            text.push(b as char);
            self.pos += 1;
        }
        text.parse::<f64>().map_err(|_| CalcError::UnexpectedToken(self.tokens[start].0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_and_parentheses() {
        assert_eq!(evaluate("1 + 2 * 3"), Ok(7.0));
        assert_eq!(evaluate("(1 + 2) * 3"), Ok(9.0));
        assert_eq!(evaluate("10 / 4"), Ok(2.5));
        assert_eq!(evaluate("-(2 + 3) * -2"), Ok(10.0));
        assert_eq!(evaluate("8 - 3 - 2"), Ok(3.0));
    }

    #[test]
    fn rejects_anything_off_the_allow_list() {
        assert_eq!(evaluate("2 + alert(1)"), Err(CalcError::InvalidCharacters));
        assert_eq!(evaluate("2 ** 3 ; rm"), Err(CalcError::InvalidCharacters));
        assert_eq!(evaluate("2^3"), Err(CalcError::InvalidCharacters));
    }

    #[test]
    fn structural_errors() {
        assert_eq!(evaluate("   "), Err(CalcError::Empty));
        assert_eq!(evaluate("(1 + 2"), Err(CalcError::Unbalanced));
        assert_eq!(evaluate("1 + 2)"), Err(CalcError::Unbalanced));
        assert_eq!(evaluate("4 / (2 - 2)"), Err(CalcError::DivisionByZero));
        assert_eq!(evaluate("1 2"), Err(CalcError::UnexpectedToken(2)));
        assert_eq!(evaluate("3 *"), Err(CalcError::UnexpectedToken(3)));
        assert!(matches!(evaluate("1..2"), Err(CalcError::UnexpectedToken(0))));
    }

    #[test]
    fn deep_nesting_is_an_error() {
        let deep = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(evaluate(&deep), Err(CalcError::TooDeep));
        assert_eq!(evaluate(&format!("{}1", "-".repeat(10_000))), Err(CalcError::TooDeep));
        // Sequential groups do not add up.
        let flat = vec!["(1)"; 200].join(" + ");
        assert_eq!(evaluate(&flat), Ok(200.0));
        let ok = format!("{}2{}", "(".repeat(60), ")".repeat(60));
        assert_eq!(evaluate(&format!("-{ok}")), Ok(-2.0));
    }

    #[test]
    fn formats_integral_results_without_fraction() {
        assert_eq!(format_result(7.0), "7");
        assert_eq!(format_result(-2.0), "-2");
        assert_eq!(format_result(2.5), "2.5");
    }
}
