use crate::error::Error;
use symcalc_compute::numerical::{ctxt::Ctxt, eval::Eval, trig_mode::TrigMode, value::Value};
use symcalc_compute::symbolic::{derivative::Differentiator, expr::ExprArena, simplify};
use tracing::debug;

/// A line of input to the REPL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// Evaluate an expression or definition.
    Eval(&'a str),

    /// `:simplify <expr>`
    Simplify(&'a str),

    /// `:diff <var> <expr>`
    Diff { var: &'a str, expr: &'a str },

    /// `:steps <var> <expr>`, which prints the derivation trace.
    Steps { var: &'a str, expr: &'a str },

    /// `:mode rad|deg|grad`
    Mode(TrigMode),
}

impl<'a> Command<'a> {
    /// Parses a line of input.
    pub fn parse(line: &'a str) -> Result<Self, Error> {
        let line = line.trim();
        let Some(rest) = line.strip_prefix(':') else {
            return Ok(Command::Eval(line));
        };

        let (name, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        let args = args.trim();
        match name {
            "simplify" => Ok(Command::Simplify(args)),
            "diff" | "steps" => {
                let (var, expr) = args.split_once(char::is_whitespace)
                    .ok_or_else(|| Error::Command(format!("usage: :{} <variable> <expression>", name)))?;
                let (var, expr) = (var.trim(), expr.trim());
                if name == "diff" {
                    Ok(Command::Diff { var, expr })
                } else {
                    Ok(Command::Steps { var, expr })
                }
            },
            "mode" => args.parse()
                .map(Command::Mode)
                .map_err(|_| Error::Command(format!("unknown angle mode `{}`; expected rad, deg or grad", args))),
            _ => Err(Error::Command(format!("unknown command `:{}`", name))),
        }
    }

    /// Returns the source that the spans of errors produced by this command point into.
    pub fn source(&self) -> &'a str {
        match self {
            Command::Eval(src) | Command::Simplify(src) => src,
            Command::Diff { expr, .. } | Command::Steps { expr, .. } => expr,
            Command::Mode(_) => "",
        }
    }
}

/// The state kept between lines: the arena holding every expression entered so far, and the
/// context holding the variables and functions defined so far.
#[derive(Debug, Default)]
pub struct Session {
    arena: ExprArena,
    ctxt: Ctxt,
}

impl Session {
    /// Creates a session with the default constants bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs a command, returning the text to print, if any.
    pub fn run(&mut self, command: Command<'_>) -> Result<Option<String>, Error> {
        debug!(?command, "running command");
        match command {
            Command::Eval(src) => {
                let id = self.arena.parse_with(src, &self.ctxt)?;
                match self.arena.node(id).eval(&mut self.ctxt)? {
                    Value::Unit => Ok(None),
                    value => Ok(Some(value.to_string())),
                }
            },
            Command::Simplify(src) => {
                let id = self.arena.parse_with(src, &self.ctxt)?;
                let simplified = simplify(&mut self.arena, id)?;
                Ok(Some(self.arena.node(simplified).to_string()))
            },
            Command::Diff { var, expr } => {
                let id = self.arena.parse_with(expr, &self.ctxt)?;
                let derivative = Differentiator::new(var)
                    .with_params(&self.ctxt)
                    .with_trace(false)
                    .differentiate(&mut self.arena, id)?;
                Ok(Some(self.arena.node(derivative).to_string()))
            },
            Command::Steps { var, expr } => {
                let id = self.arena.parse_with(expr, &self.ctxt)?;
                let mut differentiator = Differentiator::new(var).with_params(&self.ctxt);
                differentiator.differentiate(&mut self.arena, id)?;
                let trace = differentiator.steps().display(&self.arena, var);
                Ok(Some(trace.trim_end().to_string()))
            },
            Command::Mode(mode) => {
                self.ctxt.trig_mode = mode;
                Ok(Some(format!("angles are in {}", mode)))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    fn run(session: &mut Session, line: &str) -> Option<String> {
        session.run(Command::parse(line).unwrap()).unwrap()
    }

    #[test]
    fn parse_commands() {
        assert_eq!(Command::parse("1 + 2").unwrap(), Command::Eval("1 + 2"));
        assert_eq!(Command::parse(":simplify x + 0").unwrap(), Command::Simplify("x + 0"));
        assert_eq!(
            Command::parse(":diff x  x^2 + 1").unwrap(),
            Command::Diff { var: "x", expr: "x^2 + 1" },
        );
        assert_eq!(Command::parse(":mode deg").unwrap(), Command::Mode(TrigMode::Degrees));
    }

    #[test]
    fn malformed_commands() {
        assert!(matches!(Command::parse(":diff x"), Err(Error::Command(_))));
        assert!(matches!(Command::parse(":mode turns"), Err(Error::Command(_))));
        assert!(matches!(Command::parse(":integrate x"), Err(Error::Command(_))));
    }

    #[test]
    fn definitions_persist() {
        let mut session = Session::new();
        assert_eq!(run(&mut session, "a = 3"), Some("3".to_string()));
        assert_eq!(run(&mut session, "f(t) = t^2 + a"), None);
        assert_eq!(run(&mut session, "f(2)"), Some("7".to_string()));
        assert_eq!(run(&mut session, ":diff x f(x)"), Some("2 * x".to_string()));
    }

    #[test]
    fn symbolic_commands() {
        let mut session = Session::new();
        assert_eq!(run(&mut session, ":simplify 2x + 3x"), Some("5 * x".to_string()));
        assert_eq!(run(&mut session, ":diff x sin(x)"), Some("cos(x)".to_string()));
        assert_eq!(
            run(&mut session, ":steps x x^2"),
            Some("d/dx x^2 = 2 * x  [power rule]\n  d/dx x = 1  [variable]".to_string()),
        );
    }

    #[test]
    fn angle_mode() {
        let mut session = Session::new();
        run(&mut session, ":mode deg");
        assert_eq!(run(&mut session, "cos(180)"), Some("-1".to_string()));
    }

    #[test]
    fn errors_are_returned() {
        let mut session = Session::new();
        let err = session.run(Command::parse("1 / 0").unwrap()).unwrap_err();
        assert!(matches!(err, Error::Compute(_)));
    }
}
