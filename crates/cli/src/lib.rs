// brdiff CLI library: pure output formatting shared by the binary and its tests.

pub mod report;
