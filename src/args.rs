use std::error::Error;

pub struct ArgParser {
    iter: std::vec::IntoIter<String>,
    command_name: String,
}

impl ArgParser {
    pub fn new(args: Vec<String>, command_name: &str) -> Self {
        Self { iter: args.into_iter(), command_name: command_name.to_string() }
    }

    /// Extract a string value for a flag
    pub fn extract_value(&mut self, flag: &str) -> Result<String, Box<dyn Error>> {
        self.iter.next().ok_or_else(|| {
            format!("Provide a value after {} for {}", flag, self.command_name)
                .into()
        })
    }

    /// Extract and parse a numeric value for a flag
    pub fn extract_number<T: std::str::FromStr>(
        &mut self,
        flag: &str,
    ) -> Result<T, Box<dyn Error>> {
        let raw = self.extract_value(flag)?;
        raw.parse().map_err(|_| {
            format!("{} for {} must be a number", flag, self.command_name).into()
        })
    }

    /// Get next argument
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<String> {
        self.iter.next()
    }

    pub fn unknown_flag(&self, flag: &str) -> Box<dyn Error> {
        format!("Unknown flag for {}: {flag}", self.command_name).into()
    }
}

/// Convert a 1-based position typed by the user into a 0-based index.
pub fn parse_position(raw: &str) -> Result<usize, Box<dyn Error>> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("Position must be a number starting at 1: {raw}").into()),
    }
}
