use std::fmt;

/// 文件的縮排樣式。 / Indentation style inferred for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indentation {
    Spaces(u8),
    Tabs(u8),
}

impl Indentation {
    /// 縮排是否使用空白字元。 / Whether the document indents with spaces.
    pub fn inserts_spaces(self) -> bool {
        matches!(self, Indentation::Spaces(_))
    }

    /// 單一縮排層級的寬度。 / Width of one indentation level.
    pub fn size(self) -> u8 {
        match self {
            Indentation::Spaces(size) | Indentation::Tabs(size) => size,
        }
    }
}

impl fmt::Display for Indentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Indentation::Spaces(size) => write!(f, "Spaces: {size}"),
            Indentation::Tabs(size) => write!(f, "Tabs: {size}"),
        }
    }
}

const CANDIDATE_WIDTHS: [u8; 7] = [2, 4, 6, 8, 3, 5, 7];

/// 依文字內容推測縮排；無法判斷時使用預設值。 / Guesses the indentation of `text`, falling back to `default` when nothing is indented.
///
/// Lines led by a tab vote for tabs, lines led by spaces vote for spaces. The
/// space width is the most frequent positive step between consecutive
/// indented lines, limited to widths 2 through 8.
pub fn detect_indentation(text: &str, default: Indentation) -> Indentation {
    let mut tab_lines = 0usize;
    let mut space_lines = 0usize;
    let mut step_votes = [0usize; 9];
    let mut previous_spaces = 0usize;

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let leading_spaces = line.bytes().take_while(|b| *b == b' ').count();
        if line.starts_with('\t') {
            tab_lines += 1;
            previous_spaces = 0;
            continue;
        }
        if leading_spaces > 0 {
            space_lines += 1;
        }
        let step = leading_spaces.abs_diff(previous_spaces);
        if (2..=8).contains(&step) {
            step_votes[step] += 1;
        }
        previous_spaces = leading_spaces;
    }

    if tab_lines == 0 && space_lines == 0 {
        return default;
    }
    if tab_lines > space_lines {
        return Indentation::Tabs(default.size());
    }

    let mut best: Option<(u8, usize)> = None;
    for width in CANDIDATE_WIDTHS {
        let votes = step_votes[width as usize];
        if votes == 0 {
            continue;
        }
        match best {
            Some((_, best_votes)) if best_votes >= votes => {}
            _ => best = Some((width, votes)),
        }
    }
    Indentation::Spaces(best.map(|(width, _)| width).unwrap_or(default.size()))
}
