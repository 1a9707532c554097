use std::fmt;

/// A titled block of output, the terminal counterpart of a message embed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Panel {
    title: String,
    description: Option<String>,
    fields: Vec<(String, String)>,
    footer: Option<String>,
}

impl Panel {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(text.into());
        self
    }

    #[cfg(test)]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Write the panel to stdout
    pub fn print(&self) {
        println!("{}", self);
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "─".repeat(self.title.chars().count().max(24));
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", rule)?;

        if let Some(description) = &self.description {
            writeln!(f, "{}", description)?;
        }

        let width = self.fields.iter().map(|(n, _)| n.chars().count()).max().unwrap_or(0);
        for (name, value) in &self.fields {
            let mut lines = value.lines();
            writeln!(f, "{:<width$} : {}", name, lines.next().unwrap_or(""), width = width)?;
            for line in lines {
                writeln!(f, "{:<width$}   {}", "", line, width = width)?;
            }
        }

        if let Some(footer) = &self.footer {
            writeln!(f, "{}", rule)?;
            write!(f, "{}", footer)?;
        }
        Ok(())
    }
}
