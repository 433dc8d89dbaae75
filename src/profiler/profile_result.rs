use std::time::Duration;

use thiserror::Error;

/// One timed call and the calls it made. The executor produces a tree of
/// these rooted at the program run itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileResult {
    pub name: String,
    pub duration: Duration,
    pub sub_programs: Vec<ProfileResult>,
}

#[derive(Error, Debug, PartialEq)]
pub enum CsvError {
    #[error("profiler CSV data is invalid (wrong number of values on line {0})")]
    WrongValueCount(usize),
    #[error("profiler CSV data is invalid (failed to read parent index integer on line {0})")]
    InvalidParentIndex(usize),
    #[error("profiler CSV data is invalid (failed to read duration integer on line {0})")]
    InvalidDuration(usize),
    #[error("profiler CSV data is invalid (parent index out of bounds on line {0})")]
    ParentOutOfBounds(usize),
    #[error("profiler CSV data is invalid (no root entry)")]
    MissingRoot,
}

impl ProfileResult {
    pub fn new(name: &str) -> ProfileResult {
        ProfileResult {
            name: name.to_string(),
            duration: Duration::ZERO,
            sub_programs: Vec::new(),
        }
    }

    /// Sorts the direct sub-programs from slowest to fastest by insertion
    /// sort, leaving the recorded call order untouched.
    pub fn sorted_sub_programs(&self) -> Vec<&ProfileResult> {
        let mut sorted: Vec<&ProfileResult> = self.sub_programs.iter().collect();
        for i in 1..sorted.len() {
            let value = sorted[i];
            let mut index = i;
            while index > 0 && value.duration > sorted[index - 1].duration {
                sorted[index] = sorted[index - 1];
                index -= 1;
            }
            sorted[index] = value;
        }
        sorted
    }

    /// Indented dump with each level's calls sorted slowest first.
    pub fn to_sorted_string(&self, indent_amount: usize) -> String {
        let indent = "\t".repeat(indent_amount);
        let mut output = format!("{}- {} {:?}", indent, self.name, self.duration);
        if self.sub_programs.is_empty() {
            output.push('\n');
        } else {
            output.push_str(":\n");
            for sub_program in self.sorted_sub_programs() {
                output.push_str(&sub_program.to_sorted_string(indent_amount + 1));
            }
        }
        output
    }

    /// Depth-first CSV of `parent_index,name,duration_ns` rows. The root
    /// row has parent index 0; every other parent index is the 1-based row
    /// number of the parent.
    pub fn to_csv(&self) -> String {
        self.generate_csv(1, 0).0
    }

    fn generate_csv(&self, index: usize, parent_index: usize) -> (String, usize) {
        let mut csv = format!(
            "{},{},{}",
            parent_index,
            self.name,
            self.duration.as_nanos()
        );
        let mut current_index = index;
        for sub_program in &self.sub_programs {
            let (output, next_index) = sub_program.generate_csv(current_index + 1, index);
            csv.push('\n');
            csv.push_str(&output);
            current_index = next_index;
        }
        (csv, current_index)
    }

    /// Rebuilds a tree from CSV rows. Rows must reference a parent row that
    /// appeared earlier; the first row must be the root.
    pub fn parse_csv(csv: &str) -> Result<ProfileResult, CsvError> {
        let mut rows = Vec::new();
        for (i, line) in csv.trim().lines().enumerate() {
            let values: Vec<&str> = line.split(',').collect();
            if values.len() != 3 {
                return Err(CsvError::WrongValueCount(i + 1));
            }
            let parent_index: usize = values[0]
                .parse()
                .map_err(|_| CsvError::InvalidParentIndex(i + 1))?;
            let nanoseconds: u64 = values[2]
                .parse()
                .map_err(|_| CsvError::InvalidDuration(i + 1))?;
            rows.push((parent_index, values[1].to_string(), nanoseconds));
        }
        if rows.is_empty() {
            return Err(CsvError::MissingRoot);
        }

        // Children always come after their parent, so assembling from the
        // last row backwards completes every subtree before its parent
        // claims it.
        let mut pending: Vec<Vec<ProfileResult>> = rows.iter().map(|_| Vec::new()).collect();
        for i in (0..rows.len()).rev() {
            let (parent_index, name, nanoseconds) = &rows[i];
            let mut sub_programs = std::mem::take(&mut pending[i]);
            sub_programs.reverse();
            let node = ProfileResult {
                name: name.clone(),
                duration: Duration::from_nanos(*nanoseconds),
                sub_programs,
            };
            if *parent_index == 0 {
                if i == 0 {
                    return Ok(node);
                }
                return Err(CsvError::ParentOutOfBounds(i + 1));
            }
            if *parent_index > i {
                return Err(CsvError::ParentOutOfBounds(i + 1));
            }
            pending[*parent_index - 1].push(node);
        }
        Err(CsvError::MissingRoot)
    }
}
