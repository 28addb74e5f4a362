// Copyright (C) 2026 by GiGa infosystems

//! See the documentation of [`cmd!`], a utility macro for running commands (in this case `git`).

use std::process::ExitStatus;

/// Running an external command failed
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Failed to spawn `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to run `{command}`, returned status code {status}: {stderr}")]
    Failed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("`{command}` returned output that is not valid UTF-8")]
    Utf8 {
        command: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// Run an external process
///
/// # Usage
/// Example: `cmd!([git show] [(object)] -> String)`, where all segments (`git`, `show` and
/// `(object)`) can be either identifiers, which get stringified, literals or expressions in
/// parentheses. The first set of arguments is also used in error reporting ("Failed to run `git
/// show`").
///
/// If there are no further arguments, the second set of brackets is omitted.
///
/// By default the stdout output is discarded. Adding `-> String` returns it instead, excluding a
/// single trailing newline if it exists. The stderr output is always captured for the
/// [`CommandError::Failed`] error.
///
/// It may also be run in another working directory using `in path` (after a potential return
/// specifier as explained above), where `path` is an expression of the type
/// `Option<impl AsRef<Path>>`, or a reference to such a type.
macro_rules! cmd {
    (@arg $ident:ident) => { stringify!($ident) };
    (@arg $literal:literal) => { $literal };
    (@arg ($expr:expr)) => { $expr };
    (@stdout -> String) => { std::process::Stdio::piped() };
    (@stdout) => { std::process::Stdio::null() };
    (@out $command:ident $out:ident -> String) => {{
        let mut out = $out.stdout;

        if out.last() == Some(&b'\n') {
            out.pop();
        }

        String::from_utf8(out).map_err(|source| $crate::cmd::CommandError::Utf8 {
            command: $command.clone(),
            source,
        })?
    }};
    (@out $command:ident $out:ident) => { () };
    ([$cmd0:tt $($cmd_args:tt)*] $([$($args:tt)*])? $(-> $ret:tt)? $(in $path:expr)?) => {
        (|| -> Result<_, $crate::cmd::CommandError> {
            let cmd0 = $crate::cmd::cmd!(@arg $cmd0);
            let cmd_args: [&str;_] = [$($crate::cmd::cmd!(@arg $cmd_args)),*];
            let command = std::iter::once(cmd0)
                .chain(cmd_args.iter().copied())
                .collect::<Vec<_>>()
                .join(" ");

            let mut cmd = std::process::Command::new(cmd0);
            cmd.args(&cmd_args)
                $($(.arg($crate::cmd::cmd!(@arg $args)))*)?;

            $(
                if let Some(path) = $path {
                    cmd.current_dir(path);
                }
            )?

            cmd.stdout($crate::cmd::cmd!(@stdout $(-> $ret)?));
            cmd.stderr(std::process::Stdio::piped());

            tracing::trace!(%command, "Running");

            let output = cmd
                .spawn()
                .and_then(|child| child.wait_with_output())
                .map_err(|source| $crate::cmd::CommandError::Spawn {
                    command: command.clone(),
                    source,
                })?;

            if !output.status.success() {
                return Err($crate::cmd::CommandError::Failed {
                    command,
                    status: output.status,
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
                });
            }

            Ok($crate::cmd::cmd!(@out command output $(-> $ret)?))
        })()
    };
}

pub(crate) use cmd;
