use minijinja::Environment;
use serde::Serialize;

const TEMPLATES: [(&str, &str); 5] = [
    ("base.html", include_str!("../templates/base.html")),
    ("about.html", include_str!("../templates/about.html")),
    ("model.html", include_str!("../templates/model.html")),
    ("visualize.html", include_str!("../templates/visualize.html")),
    ("contact.html", include_str!("../templates/contact.html")),
];

/// HTML templates, compiled once at startup and shared read-only.
pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, minijinja::Error> {
        self.env.get_template(name)?.render(ctx)
    }
}
