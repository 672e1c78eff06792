mod cli;
mod driver;
mod editor;
mod report;

use crate::driver::Driver;

fn main() {
    Driver::new().run();
}
