use std::io::Read;

use codespan_reporting::diagnostic::Diagnostic;
use codespan_reporting::files::{Files, SimpleFile};
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use shuntc::{CalcError, Calculator};
use shuntvm::{Mode, Policy};

use crate::cli::Cli;
use crate::editor::{Editor, EditorRead};
use crate::report::Report;

pub struct Driver {
    file:       Option<SimpleFile<String, String>>,
    policy:     Policy,
    emit_rpn:   bool,
    quiet:      bool,
    max_errors: usize,
}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver {
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(<Cli as clap::Parser>::parse())
    }

    fn read_stdin() -> String {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .expect("Should read input from stdin");
        input
    }

    #[must_use]
    fn from_config(cfg: Cli) -> Self {
        let file = if cfg.stdin {
            Some(SimpleFile::new("<stdin>".to_string(), Self::read_stdin()))
        } else {
            cfg.file.map(|path| {
                let source = std::fs::read_to_string(&path).expect("Should be valid file path");
                SimpleFile::new(path, source)
            })
        };
        let mode = if cfg.lenient {
            Mode::Lenient
        } else {
            Mode::Strict
        };
        Self {
            file,
            policy: Policy {
                mode,
                capacity: cfg.capacity,
            },
            emit_rpn: cfg.rpn,
            quiet: cfg.quiet,
            max_errors: cfg.max_errors,
        }
    }

    pub fn run(self) {
        if self.file.is_some() {
            self.batch();
        } else {
            let _ = self.repl();
        }
    }

    /// Evaluates every non-blank line of the input file, continuing past
    /// lines that fail.
    fn batch(&self) {
        let Some(file) = &self.file else { return };

        let mut calc = Calculator::with_policy(self.policy);
        for line in file.source().lines() {
            let line = line.trim();
            if !line.is_empty() {
                self.evaluate(&mut calc, file.name(), line);
            }
        }
    }

    fn repl(&self) -> std::io::Result<()> {
        let mut calc = Calculator::with_policy(self.policy);
        let mut editor = Editor::default();
        loop {
            match editor.read()? {
                EditorRead::Read(input) => self.evaluate(&mut calc, "<repl>", input.trim()),
                EditorRead::Break => break,
                EditorRead::Continue => {}
            }
        }

        Ok(())
    }

    fn evaluate(&self, calc: &mut Calculator, name: &str, input: &str) {
        match calc.calculate(input) {
            Ok(value) => {
                println!("{input} = {value}");
                if self.emit_rpn {
                    println!("  rpn: {}", calc.rpn());
                }
            }
            Err(err) => self.report_calc_error(name, input, err),
        }
    }

    fn report_calc_error(&self, name: &str, source: &str, error: CalcError) {
        let file = SimpleFile::new(name, source.to_string());
        match error {
            CalcError::Lex(errors) => self.report(&errors, &file),
            CalcError::Rpn(err) => self.report(&[err], &file),
            CalcError::Eval(err) => self.report(&[err], &file),
        }
    }

    fn report<'a, F, E>(&self, errors: &[E], files: &'a F)
    where
        F: Files<'a, FileId = ()>,
        E: Report,
    {
        if self.quiet {
            return;
        }
        let writer = StandardStream::stderr(ColorChoice::Always);
        let config = codespan_reporting::term::Config::default();
        let mut displayed = 0;
        {
            let mut writer = writer.lock();
            for e in errors.iter().take(self.max_errors) {
                let _ = term::emit(&mut writer, &config, files, &e.diagnose());
                displayed += 1;
            }
        }

        if errors.len() > displayed {
            let message = format!(
                "could not evaluate due to {} previous errors ({} emitted)",
                errors.len(),
                displayed
            );
            let error = Diagnostic::error().with_message(message);
            let _ = term::emit(&mut writer.lock(), &config, files, &error);
        }
    }
}
