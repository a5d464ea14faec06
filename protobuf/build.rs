fn main() {
    println!("cargo:rerun-if-changed=./coderunner.proto");
    tonic_build::compile_protos("./coderunner.proto")
        .unwrap_or_else(|err| panic!("Failed to compile protos {:?}", err));
}
