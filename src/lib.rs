//! Golden-file regression driver.
//!
//! For every test point `(group, case)` the input fixture is staged as `testfile.txt` in a
//! working directory, the program under test is run there without arguments, and the
//! `output.txt` it leaves behind is compared line by line with the stored expected output.

pub mod check;
pub mod cli;
pub mod compare;
pub mod fixture;
pub mod runner;
pub mod subject;
