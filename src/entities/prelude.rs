pub use super::answers::Entity as Answers;
pub use super::articles::Entity as Articles;
pub use super::categories::Entity as Categories;
pub use super::questions::Entity as Questions;
pub use super::resources::Entity as Resources;
pub use super::users::Entity as Users;
