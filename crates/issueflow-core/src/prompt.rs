//! Prompt for the live generation call.

use crate::domain::TaskDescription;

const INSTRUCTIONS: &str = "## Instructions
1. Implement this in TypeScript with strict mode enabled and full type safety.
2. Emit every file as a fenced block whose opening fence carries the file path:

```path/to/file.ts
file contents
```

3. Required files:
   - src/index.ts - main entry point
   - src/types.ts - type definitions
   - any other files the implementation needs
4. Write production-quality code.

Output format:
start each file with ``` followed immediately by its path.";

/// Single-turn prompt embedding the task and the fenced-block output contract.
pub fn build_prompt(task: &TaskDescription) -> String {
    let requirements = task
        .requirements
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{}. {}", i + 1, r))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are an expert TypeScript engineer. Implement the following issue.\n\n\
         # Issue: {title}\n\n\
         {body}\n\n\
         ## Requirements\n\
         {requirements}\n\n\
         {INSTRUCTIONS}",
        title = task.title,
        body = task.body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_response;

    fn task() -> TaskDescription {
        TaskDescription {
            identifier: 9,
            title: "Add CSV export".to_string(),
            body: "Export reports\nas CSV".to_string(),
            requirements: vec!["Export reports".to_string(), "as CSV".to_string()],
            priority: "P2-Medium".to_string(),
        }
    }

    #[test]
    fn test_prompt_embeds_task() {
        let prompt = build_prompt(&task());
        assert!(prompt.contains("# Issue: Add CSV export"));
        assert!(prompt.contains("Export reports\nas CSV"));
        assert!(prompt.contains("## Requirements\n1. Export reports\n2. as CSV"));
    }

    #[test]
    fn test_prompt_describes_fence_convention() {
        let prompt = build_prompt(&task());
        assert!(prompt.contains("```path/to/file.ts"));
        assert!(prompt.contains("src/index.ts"));
        assert!(prompt.contains("src/types.ts"));
    }

    #[test]
    fn test_prompt_example_block_parses() {
        // The worked example in the instructions follows the same convention
        // the parser enforces.
        let set = parse_response(INSTRUCTIONS);
        assert_eq!(set.paths(), vec!["path/to/file.ts"]);
    }
}
