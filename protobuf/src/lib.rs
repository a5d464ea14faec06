tonic::include_proto!("coderunner");
