use alertlint_lib::survival_of;

pub struct LabelsArgs {
    pub query: String,
}

pub fn run(args: LabelsArgs) {
    match survival_of(&args.query) {
        Ok(survival) => println!("{}", survival),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
