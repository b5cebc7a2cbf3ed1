/// Maximum width of a column's content before text wraps.
pub const MAX_CELL_WIDTH: usize = 20;

/// Left-aligned text table with a rule after every row.
pub struct ConsoleTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    max_width: usize,
}

impl ConsoleTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
            max_width: MAX_CELL_WIDTH,
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn render(&self) -> String {
        let header_lines: Vec<Vec<String>> =
            self.headers.iter().map(|h| wrap(h, self.max_width)).collect();
        let body: Vec<Vec<Vec<String>>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(|cell| wrap(cell, self.max_width)).collect())
            .collect();

        let mut widths: Vec<usize> = header_lines.iter().map(|lines| line_width(lines)).collect();
        for row in &body {
            for (i, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(line_width(cell));
                }
            }
        }

        let rule = widths
            .iter()
            .fold(String::from("+"), |acc, w| acc + &"-".repeat(w + 2) + "+");

        let mut out = vec![rule.clone()];
        out.extend(render_row(&header_lines, &widths));
        out.push(rule.clone());
        for row in &body {
            out.extend(render_row(row, &widths));
            out.push(rule.clone());
        }
        out.join("\n")
    }
}

fn line_width(lines: &[String]) -> usize {
    lines.iter().map(|l| l.chars().count()).max().unwrap_or(0)
}

fn render_row(cells: &[Vec<String>], widths: &[usize]) -> Vec<String> {
    let height = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
    (0..height)
        .map(|line| {
            widths.iter().enumerate().fold(String::from("|"), |acc, (i, width)| {
                let text = cells
                    .get(i)
                    .and_then(|cell| cell.get(line))
                    .map(String::as_str)
                    .unwrap_or("");
                let pad = width - text.chars().count();
                format!("{} {}{} |", acc, text, " ".repeat(pad))
            })
        })
        .collect()
}

/// Greedy word wrap; words longer than `width` are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                lines.push(word.drain(..width).collect());
            }
            if word.is_empty() {
                continue;
            }
            let current_len = current.chars().count();
            if current_len > 0 && current_len + 1 + word.len() > width {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.extend(word);
        }
        lines.push(current);
    }
    lines
}
