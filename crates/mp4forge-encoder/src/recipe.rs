//! Placeholder substitution for the encoder's argument template.

use crate::flags::{CompiledFlags, FlagGroup};
use crate::{Error, Result};
use std::collections::HashMap;
use std::path::Path;

/// Argument order of the ffmpeg invocation.
///
/// Input analysis flags must come before `-i`, and trim flags right after
/// it so they seek the input rather than the output.
pub const DEFAULT_RECIPE: &[&str] = &[
    "{global}", "-i", "{input}", "{trim}", "{audio}", "{video}", "-y", "{threads}", "{output}",
];

/// An ordered template of literal tokens and `{placeholder}` tokens.
///
/// Each placeholder expands to zero or more tokens, so an empty group leaves
/// no gap in the result.
///
/// # Example
///
/// ```
/// use mp4forge_encoder::recipe::Recipe;
/// use mp4forge_encoder::flags::CompiledFlags;
/// use std::path::Path;
///
/// let recipe = Recipe::default();
/// let args = recipe.assemble(
///     &CompiledFlags::default(),
///     Path::new("/in/movie.mkv"),
///     Path::new("/out/movie.mp4"),
/// )?;
/// assert_eq!(args, ["-i", "/in/movie.mkv", "-y", "/out/movie.mp4"]);
/// # Ok::<(), mp4forge_encoder::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    tokens: Vec<String>,
}

impl Recipe {
    /// Create a recipe from template tokens.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Expand the template with compiled flags and the input/output paths.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Recipe`] for a placeholder that names neither a flag
    /// group nor `input`/`output`.
    pub fn assemble(&self, flags: &CompiledFlags, input: &Path, output: &Path) -> Result<Vec<String>> {
        let mut vars: HashMap<&str, Vec<String>> = FlagGroup::ALL
            .iter()
            .map(|group| (group.placeholder(), flags.group(*group).to_vec()))
            .collect();
        vars.insert("input", vec![input.display().to_string()]);
        vars.insert("output", vec![output.display().to_string()]);

        self.substitute(&vars)
    }

    /// Splice variables into the template.
    pub fn substitute(&self, vars: &HashMap<&str, Vec<String>>) -> Result<Vec<String>> {
        let mut args = Vec::with_capacity(self.tokens.len() * 2);
        for token in &self.tokens {
            match placeholder(token) {
                Some(name) => {
                    let values = vars.get(name).ok_or_else(|| Error::Recipe {
                        placeholder: name.to_string(),
                    })?;
                    args.extend(values.iter().cloned());
                }
                None => args.push(token.clone()),
            }
        }
        Ok(args)
    }
}

impl Default for Recipe {
    fn default() -> Self {
        Self::new(DEFAULT_RECIPE.iter().copied())
    }
}

fn placeholder(token: &str) -> Option<&str> {
    token
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .filter(|name| !name.is_empty())
}

/// Render a program and its arguments as one shell command line.
///
/// Arguments containing whitespace, quotes or other shell metacharacters are
/// single-quoted.
pub fn to_command_line(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .map(quote)
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote(token: &str) -> String {
    let safe = !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=+,@%".contains(c));
    if safe {
        token.to_string()
    } else {
        format!("'{}'", token.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::compile;
    use crate::profile::Settings;
    use crate::resolve::resolve;
    use crate::setting::{Setting, SettingValue};
    use crate::source::SourceInfo;

    fn flags(pairs: &[(Setting, SettingValue)]) -> CompiledFlags {
        let overrides: Settings = pairs.iter().cloned().collect();
        compile(&resolve(&Settings::new(), &overrides), &SourceInfo::default()).unwrap()
    }

    #[test]
    fn test_group_order_is_fixed() {
        let flags = flags(&[
            (Setting::Threads, SettingValue::Int(2)),
            (Setting::Duration, SettingValue::Int(30)),
            (Setting::ProbeSize, SettingValue::Int(5_000_000)),
            (Setting::AudioChannels, SettingValue::Int(1)),
        ]);
        let args = Recipe::default()
            .assemble(&flags, Path::new("in.ivf"), Path::new("out.mp4"))
            .unwrap();

        let pos = |needle: &str| args.iter().position(|a| a == needle).unwrap();
        assert_eq!(pos("-probesize"), 0);
        assert!(pos("-probesize") < pos("-i"));
        assert!(pos("-i") < pos("-t"));
        assert!(pos("-t") < pos("-c:a"));
        assert!(pos("-ac") < pos("-c:v"));
        assert!(pos("-c:v") < pos("-y"));
        assert!(pos("-y") < pos("-threads"));
        assert_eq!(args.last().unwrap(), "out.mp4");
    }

    #[test]
    fn test_empty_groups_leave_no_tokens() {
        let args = Recipe::default()
            .assemble(&CompiledFlags::default(), Path::new("a"), Path::new("b"))
            .unwrap();
        assert!(args.iter().all(|a| !a.is_empty()));
        assert_eq!(args, ["-i", "a", "-y", "b"]);
    }

    #[test]
    fn test_unknown_placeholder() {
        let recipe = Recipe::new(["-i", "{input}", "{subtitles}", "{output}"]);
        let err = recipe
            .assemble(&CompiledFlags::default(), Path::new("a"), Path::new("b"))
            .unwrap_err();
        assert_eq!(
            err,
            Error::Recipe {
                placeholder: "subtitles".into()
            }
        );
    }

    #[test]
    fn test_literal_braces_are_not_placeholders() {
        let recipe = Recipe::new(["{}", "-i", "{input}"]);
        let args = recipe
            .assemble(&CompiledFlags::default(), Path::new("a"), Path::new("b"))
            .unwrap();
        assert_eq!(args, ["{}", "-i", "a"]);
    }

    #[test]
    fn test_command_line_quoting() {
        let args = vec![
            "-i".to_string(),
            "/media/My Movie.mkv".to_string(),
            "-vf".to_string(),
            "hqdn3d=4:3:6:4.5".to_string(),
            "it's.mp4".to_string(),
        ];
        assert_eq!(
            to_command_line("ffmpeg", &args),
            r"ffmpeg -i '/media/My Movie.mkv' -vf hqdn3d=4:3:6:4.5 'it'\''s.mp4'"
        );
    }
}
