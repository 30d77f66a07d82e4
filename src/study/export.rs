use std::io::Write;

use crate::types::TrialState;

use super::Study;

impl Study {
    /// Write every trial to `writer` in CSV format.
    ///
    /// Columns: `trial_id`, `state`, `value`, one column per search-space
    /// parameter in name order, then `error`. Trials that did not complete
    /// have an empty `value` cell.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if writing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use latfit::{ParamSet, SearchSpace, Study};
    ///
    /// let space = SearchSpace::builder().float("x", 0.0, 10.0).build().unwrap();
    /// let study = Study::builder().search_space(space).open().unwrap();
    /// let id = study.begin_trial(ParamSet::from([("x".to_string(), 2.5)])).unwrap();
    /// study.complete_trial(id, 0.42).unwrap();
    ///
    /// let mut buf = Vec::new();
    /// study.to_csv(&mut buf).unwrap();
    /// let csv = String::from_utf8(buf).unwrap();
    /// assert_eq!(csv, "trial_id,state,value,x,error\n0,complete,0.42,2.5,\n");
    /// ```
    pub fn to_csv(&self, mut writer: impl Write) -> std::io::Result<()> {
        let names: Vec<&str> = self.space.names().collect();

        write!(writer, "trial_id,state,value")?;
        for name in &names {
            write!(writer, ",{}", csv_escape(name))?;
        }
        writeln!(writer, ",error")?;

        for trial in self.trials.read().iter() {
            write!(writer, "{},{}", trial.id, trial.state.as_str())?;

            // Value: empty for non-complete trials.
            match trial.value {
                Some(value) if trial.state == TrialState::Complete => write!(writer, ",{value}")?,
                _ => write!(writer, ",")?,
            }

            for name in &names {
                match trial.params.get(*name) {
                    Some(value) => write!(writer, ",{value}")?,
                    None => write!(writer, ",")?,
                }
            }

            let error = trial.error.as_deref().unwrap_or_default();
            writeln!(writer, ",{}", csv_escape(error))?;
        }

        Ok(())
    }
}

/// Quote a CSV field if it contains a comma, quote, or newline.
fn csv_escape(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
