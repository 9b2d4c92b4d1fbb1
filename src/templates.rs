use std::sync::OnceLock;
use tera::Tera;

static TERA: OnceLock<Tera> = OnceLock::new();

pub const REPORT_TEMPLATE: &str = "report.html";

pub fn get_tera() -> &'static Tera {
    TERA.get_or_init(|| {
        let mut tera = Tera::default();
        tera.add_raw_template(REPORT_TEMPLATE, include_str!("../templates/report.html"))
            .expect("Failed to load templates");
        tera
    })
}
