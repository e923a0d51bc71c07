use std::fs;
use std::io;
use std::path::Path;

/// Lays out a new project: `<name>/<name>.ktconfig` plus a starter
/// `template/Template.kt`.
pub fn create_project(name: &str) -> io::Result<()> {
    println!("Creating new project: {name}");

    let root = Path::new(name);
    fs::create_dir_all(root.join("template"))?;

    let config_path = root.join(format!("{name}.ktconfig"));
    fs::write(&config_path, ktconfig(name))?;

    let template_path = root.join("template").join("Template.kt");
    fs::write(&template_path, template(name))?;

    println!("Project created successfully!");
    println!("  Config: {}", config_path.display());
    println!("  Template: {}", template_path.display());
    println!("\nRun with: kt run --file={name}/template/Template.kt");
    Ok(())
}

fn ktconfig(name: &str) -> String {
    format!(
        r#"{{
  "projectName": "{name}",
  "dotnetVersion": "8",
  "projectType": "game",
  "autoOptimized": true,
  "includes": [
    "System.Interface",
    "Windows.NET8"
  ],
  "entryPoint": "Template.kt"
}}
"#
    )
}

fn template(name: &str) -> String {
    format!(
        r#"including System.Interface#
including Windows.NET8#

projectSpace {name} [
    {name}.WhenRan[
        StartAll.Components()
        App.New = New WindowComponent("{name}", false, false, Windowed, 1280x720)
    ]

    NewFunc Initialize() (
        Console.Write("Hello from {name}!")
    )

    {name}.Update[
        <-- Game loop goes here -->
    ]

    {name}.Draw[
        <-- Drawing code goes here -->
    ]
]
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ktconfig_names_the_project() {
        let config = ktconfig("demo");
        assert!(config.contains("\"projectName\": \"demo\""));
        assert!(config.contains("\"entryPoint\": \"Template.kt\""));
    }

    #[test]
    fn test_template_greets_from_the_project() {
        let template = template("demo");
        assert!(template.starts_with("including System.Interface#\n"));
        assert!(template.contains("Console.Write(\"Hello from demo!\")"));
    }
}
