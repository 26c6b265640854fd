use crate::document::model::{
    Achievement, Document, Education, EntryId, Experience, Extras, Personal, Project, Skill,
};

/// Sample resume loaded by "load demo". Every call mints fresh entry ids.
pub fn demo_document() -> Document {
    Document {
        personal: Personal {
            first_name: "Jordan".to_string(),
            last_name: "Rivera".to_string(),
            title: "Product Designer · AI-Driven Experiences".to_string(),
            email: "jordan.rivera@example.com".to_string(),
            phone: "+1 (555) 123-4567".to_string(),
            location: "San Francisco, CA".to_string(),
            website: "https://jordandesigns.com".to_string(),
            linkedin: "https://www.linkedin.com/in/jordanrivera".to_string(),
            github: String::new(),
        },
        summary: "Design leader crafting AI-powered tools that balance usability with measurable outcomes.\n\
                  Trusted to ship end-to-end experiences across growth-stage startups and enterprise platforms."
            .to_string(),
        experience: vec![
            Experience {
                id: EntryId::new(),
                company: "Atlas AI Suite".to_string(),
                position: "Lead Product Designer".to_string(),
                location: "Remote".to_string(),
                start_date: "Jan 2022".to_string(),
                end_date: String::new(),
                is_current: true,
                description: "• Led design for resume intelligence product adopted by 400+ talent teams\n\
                              • Improved candidate match accuracy by 28% through ATS signal experiments\n\
                              • Built design system powering three cross-platform launches in 9 months"
                    .to_string(),
            },
            Experience {
                id: EntryId::new(),
                company: "Northwind Labs".to_string(),
                position: "Senior UX Designer".to_string(),
                location: "New York, NY".to_string(),
                start_date: "Mar 2019".to_string(),
                end_date: "Dec 2021".to_string(),
                is_current: false,
                description: "- Owned end-to-end redesign of analytics suite increasing retention by 18%\n\
                              - Partnered with data science to visualize predictive hiring insights"
                    .to_string(),
            },
        ],
        education: vec![Education {
            id: EntryId::new(),
            institution: "Parsons School of Design".to_string(),
            degree: "BFA".to_string(),
            field: "Communication Design".to_string(),
            location: "New York, NY".to_string(),
            start_date: "2012".to_string(),
            end_date: "2016".to_string(),
            gpa: "3.8".to_string(),
        }],
        skills: [
            ("Product Strategy", "Design"),
            ("User Research", "Design"),
            ("Figma", "Tools"),
            ("Prototyping", "Design"),
            ("Framer", "Tools"),
            ("AI Copilots", ""),
        ]
        .into_iter()
        .map(|(name, category)| Skill {
            id: EntryId::new(),
            name: name.to_string(),
            category: category.to_string(),
        })
        .collect(),
        projects: vec![Project {
            id: EntryId::new(),
            name: "ResumeGenie Builder".to_string(),
            description: "Collaborative resume editor with live ATS insights and multi-template exports."
                .to_string(),
            technologies: vec!["React".to_string(), "TypeScript".to_string()],
            url: "https://resumegenie.ai".to_string(),
            repository_url: String::new(),
        }],
        achievements: vec![
            Achievement {
                id: EntryId::new(),
                title: "Speaker, UXDX 2024".to_string(),
                description: "Designing trustworthy AI copilots".to_string(),
                date: "2024".to_string(),
            },
            Achievement {
                id: EntryId::new(),
                title: "Winner, Adobe Creative Jam".to_string(),
                description: String::new(),
                date: String::new(),
            },
        ],
        extras: Extras {
            languages: vec!["English".to_string(), "Spanish".to_string()],
            certifications: vec!["Google UX Design Certificate".to_string()],
            interests: vec!["Mentoring @ ADPList".to_string(), "Generative art".to_string()],
        },
    }
}
