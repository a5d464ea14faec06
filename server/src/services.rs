pub mod coderunner;
