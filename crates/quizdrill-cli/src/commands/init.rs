//! The `quizdrill init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create quizdrill.toml
    if std::path::Path::new("quizdrill.toml").exists() {
        println!("quizdrill.toml already exists, skipping.");
    } else {
        std::fs::write("quizdrill.toml", SAMPLE_CONFIG)?;
        println!("Created quizdrill.toml");
    }

    // Create a small example course
    std::fs::create_dir_all("data")?;
    for (name, contents) in DATA_FILES {
        let path = std::path::Path::new("data").join(name);
        if path.exists() {
            println!("data/{name} already exists, skipping.");
        } else {
            std::fs::write(&path, contents)?;
            println!("Created data/{name}");
        }
    }

    println!("\nNext steps:");
    println!("  1. Run: quizdrill validate");
    println!("  2. Run: quizdrill list");
    println!("  3. Run: quizdrill take module m1");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizdrill configuration

manifest = "data/quiz-data.json"

# Question sets load from the manifest's directory unless a source is
# configured:
#
# [source]
# type = "http"
# base_url = "${QUIZDRILL_BASE_URL}"
#
# [source]
# type = "dir"
# path = "data"

max_retries = 2
batch_size = 5
pooled_cap = 100
final_exam_minutes = 75
custom_count = 20
store_path = "saved-quizzes.json"
"#;

const DATA_FILES: &[(&str, &str)] = &[
    ("quiz-data.json", SAMPLE_MANIFEST),
    ("m1.json", MODULE_ONE),
    ("m2.json", MODULE_TWO),
    ("cp1.json", CHECKPOINT_ONE),
    ("final-a.json", FINAL_EXAM_A),
];

const SAMPLE_MANIFEST: &str = r#"{
  "modules": [
    { "id": "m1", "title": "Networking Basics", "file": "m1.json", "moduleNumber": 1 },
    { "id": "m2", "title": "Routing and Switching", "file": "m2.json", "moduleNumber": 2 }
  ],
  "checkpoints": [
    {
      "id": "cp1",
      "title": "Checkpoint 1 (Modules 1-2)",
      "file": "cp1.json",
      "moduleRange": [1, 2]
    }
  ],
  "finalExams": [
    { "id": "final-a", "title": "Final Exam Form A", "file": "final-a.json" }
  ]
}
"#;

const MODULE_ONE: &str = r#"{
  "title": "Networking Basics",
  "passPercentage": 80,
  "questions": [
    {
      "type": "single",
      "question": "Which device forwards packets between different networks?",
      "options": [
        { "text": "Switch" },
        { "text": "Router", "isCorrect": true },
        { "text": "Hub" },
        { "text": "Repeater" }
      ],
      "explanation": "Routers make forwarding decisions on layer 3 addresses."
    },
    {
      "type": "multiple",
      "question": "Which of these are private IPv4 ranges?",
      "options": [
        { "text": "10.0.0.0/8", "isCorrect": true },
        { "text": "172.16.0.0/12", "isCorrect": true },
        { "text": "8.8.8.0/24" },
        { "text": "192.168.0.0/16", "isCorrect": true }
      ]
    },
    {
      "type": "match",
      "question": "Match each protocol to its default port.",
      "pairs": [
        { "left": "HTTP", "right": "80" },
        { "left": "HTTPS", "right": "443" },
        { "left": "SSH", "right": "22" }
      ]
    }
  ]
}
"#;

const MODULE_TWO: &str = r#"{
  "title": "Routing and Switching",
  "questions": [
    {
      "type": "single",
      "question": "What does a switch use to build its MAC address table?",
      "options": [
        { "text": "Destination IP addresses" },
        { "text": "Source MAC addresses", "isCorrect": true },
        { "text": "ARP replies only" }
      ]
    },
    {
      "type": "dropdown-match",
      "question": "Match each routing concept to its description.",
      "pairs": [
        { "left": "Static route", "right": "Configured by hand" },
        { "left": "Default route", "right": "Used when nothing else matches" }
      ]
    }
  ]
}
"#;

// An empty checkpoint document pools its questions from the covered modules.
const CHECKPOINT_ONE: &str = r#"{
  "title": "Checkpoint 1",
  "questions": []
}
"#;

const FINAL_EXAM_A: &str = r#"{
  "title": "Final Exam Form A",
  "timeLimit": 60,
  "questions": []
}
"#;
