use commit_report::run;
use miette::Result;

fn main() -> Result<()> {
    run()
}
